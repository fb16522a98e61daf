use crate::{Db, types::ProfileRow};
use vbid_core::{
    models::ProfileRecord,
    ports::{ProfileFailure, ProfileRepository},
};

impl ProfileRepository for Db {
    async fn create_profile(
        &self,
        bidder_id: Self::BidderId,
        username: String,
        as_of: Self::DateTime,
    ) -> Result<Result<ProfileRecord<Self::DateTime, Self::BidderId>, ProfileFailure>, Self::Error>
    {
        let result = sqlx::query(
            r#"
            insert into
                profiles (bidder_id, username, created_at)
            values
                ($1, $2, $3)
            "#,
        )
        .bind(bidder_id)
        .bind(&username)
        .bind(as_of)
        .execute(&self.writer)
        .await;

        match result {
            Ok(_) => Ok(Ok(ProfileRecord {
                bidder_id,
                username,
                created_at: as_of,
            })),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // Two unique constraints can fire; the primary key means
                // the bidder already has a profile, the username index
                // means someone else owns the name.
                let failure = if db_err.message().contains("profiles.bidder_id") {
                    ProfileFailure::AlreadyExists
                } else {
                    ProfileFailure::UsernameTaken
                };
                Ok(Err(failure))
            }
            Err(other) => Err(other),
        }
    }

    async fn get_profile(
        &self,
        bidder_id: Self::BidderId,
    ) -> Result<Option<ProfileRecord<Self::DateTime, Self::BidderId>>, Self::Error> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            select
                bidder_id, username, created_at
            from
                profiles
            where
                bidder_id = $1
            "#,
        )
        .bind(bidder_id)
        .fetch_optional(&self.reader)
        .await?;

        Ok(row.map(Into::into))
    }
}

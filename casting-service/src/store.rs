use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{query, query_as, PgPool};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub release_date: NaiveDate,
}

/// Body of `POST /movies` and `PATCH /movies/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MovieInput {
    pub title: String,
    /// ISO `YYYY-MM-DD`.
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Actor {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub gender: String,
}

/// Body of `POST /actors` and `PATCH /actors/:id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActorInput {
    pub name: String,
    #[serde(deserialize_with = "age_from_number_or_string")]
    pub age: i32,
    pub gender: String,
}

// Clients send age both as a JSON number and as a numeric string.
fn age_from_number_or_string<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AgeRepr {
        Number(i32),
        Text(String),
    }

    match AgeRepr::deserialize(deserializer)? {
        AgeRepr::Number(age) => Ok(age),
        AgeRepr::Text(raw) => raw
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid age '{raw}'"))),
    }
}

/// Persistence for movies and actors. Each write is a single atomic statement.
#[async_trait]
pub trait CastingStore: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<Movie>>;
    async fn find_movie(&self, id: i32) -> Result<Option<Movie>>;
    async fn insert_movie(&self, input: MovieInput) -> Result<Movie>;
    async fn update_movie(&self, id: i32, input: MovieInput) -> Result<Option<Movie>>;
    async fn delete_movie(&self, id: i32) -> Result<bool>;

    async fn list_actors(&self) -> Result<Vec<Actor>>;
    async fn find_actor(&self, id: i32) -> Result<Option<Actor>>;
    async fn insert_actor(&self, input: ActorInput) -> Result<Actor>;
    async fn update_actor(&self, id: i32, input: ActorInput) -> Result<Option<Actor>>;
    async fn delete_actor(&self, id: i32) -> Result<bool>;
}

#[derive(Clone)]
pub struct PgCastingStore {
    db: PgPool,
}

impl PgCastingStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CastingStore for PgCastingStore {
    async fn list_movies(&self) -> Result<Vec<Movie>> {
        let movies = query_as::<_, Movie>("SELECT id, title, release_date FROM movies ORDER BY id")
            .fetch_all(&self.db)
            .await?;
        Ok(movies)
    }

    async fn find_movie(&self, id: i32) -> Result<Option<Movie>> {
        let movie =
            query_as::<_, Movie>("SELECT id, title, release_date FROM movies WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        Ok(movie)
    }

    async fn insert_movie(&self, input: MovieInput) -> Result<Movie> {
        let movie = query_as::<_, Movie>(
            "INSERT INTO movies (title, release_date) VALUES ($1, $2) RETURNING id, title, release_date",
        )
        .bind(input.title)
        .bind(input.release_date)
        .fetch_one(&self.db)
        .await?;
        Ok(movie)
    }

    async fn update_movie(&self, id: i32, input: MovieInput) -> Result<Option<Movie>> {
        let movie = query_as::<_, Movie>(
            "UPDATE movies SET title = $1, release_date = $2 WHERE id = $3 RETURNING id, title, release_date",
        )
        .bind(input.title)
        .bind(input.release_date)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(movie)
    }

    async fn delete_movie(&self, id: i32) -> Result<bool> {
        let result = query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_actors(&self) -> Result<Vec<Actor>> {
        let actors = query_as::<_, Actor>("SELECT id, name, age, gender FROM actors ORDER BY id")
            .fetch_all(&self.db)
            .await?;
        Ok(actors)
    }

    async fn find_actor(&self, id: i32) -> Result<Option<Actor>> {
        let actor = query_as::<_, Actor>("SELECT id, name, age, gender FROM actors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(actor)
    }

    async fn insert_actor(&self, input: ActorInput) -> Result<Actor> {
        let actor = query_as::<_, Actor>(
            "INSERT INTO actors (name, age, gender) VALUES ($1, $2, $3) RETURNING id, name, age, gender",
        )
        .bind(input.name)
        .bind(input.age)
        .bind(input.gender)
        .fetch_one(&self.db)
        .await?;
        Ok(actor)
    }

    async fn update_actor(&self, id: i32, input: ActorInput) -> Result<Option<Actor>> {
        let actor = query_as::<_, Actor>(
            "UPDATE actors SET name = $1, age = $2, gender = $3 WHERE id = $4 RETURNING id, name, age, gender",
        )
        .bind(input.name)
        .bind(input.age)
        .bind(input.gender)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(actor)
    }

    async fn delete_actor(&self, id: i32) -> Result<bool> {
        let result = query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    db::{Database, Param, StorageError},
    validate::{present, Page, PageQuery},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Tutorial {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub difficulty: String,
    pub category: String,
    pub duration: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DifficultyCount {
    pub difficulty: String,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct TutorialListQuery {
    #[serde(flatten)]
    pub paging: PageQuery,
    pub difficulty: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TutorialFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TutorialListQuery {
    pub fn filter(&self) -> TutorialFilter {
        TutorialFilter {
            difficulty: present(&self.difficulty).map(str::to_owned),
            category: present(&self.category).map(str::to_owned),
        }
    }
}

impl Tutorial {
    pub async fn list(
        db: &Database,
        filter: &TutorialFilter,
        page: Page,
    ) -> Result<Vec<Tutorial>, StorageError> {
        let mut sql = String::from("SELECT * FROM tutorials WHERE 1=1");
        let mut params: Vec<Param> = Vec::new();
        if let Some(difficulty) = &filter.difficulty {
            sql.push_str(" AND difficulty = ?");
            params.push(difficulty.as_str().into());
        }
        if let Some(category) = &filter.category {
            sql.push_str(" AND category = ?");
            params.push(category.as_str().into());
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
        params.push(page.limit.into());
        params.push(page.offset().into());
        db.query(&sql, &params).await
    }

    pub async fn find(db: &Database, id: i64) -> Result<Option<Tutorial>, StorageError> {
        db.query_one("SELECT * FROM tutorials WHERE id = ?", &[id.into()])
            .await
    }

    pub async fn categories(db: &Database) -> Result<Vec<CategoryCount>, StorageError> {
        db.query(
            "SELECT category, COUNT(*) AS count FROM tutorials \
             GROUP BY category ORDER BY count DESC, category ASC",
            &[],
        )
        .await
    }

    /// Levels in teaching order: beginner, intermediate, advanced, then
    /// anything unrecognised.
    pub async fn difficulties(db: &Database) -> Result<Vec<DifficultyCount>, StorageError> {
        db.query(
            "SELECT difficulty, COUNT(*) AS count FROM tutorials GROUP BY difficulty \
             ORDER BY CASE difficulty \
                 WHEN 'beginner' THEN 1 \
                 WHEN 'intermediate' THEN 2 \
                 WHEN 'advanced' THEN 3 \
                 ELSE 4 END, difficulty ASC",
            &[],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn db() -> Database {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        for (title, difficulty, category) in [
            ("t1", "advanced", "Seguridad"),
            ("t2", "expert", "Seguridad"),
            ("t3", "beginner", "HTTP"),
            ("t4", "intermediate", "HTTP"),
            ("t5", "beginner", "HTTP"),
        ] {
            db.execute(
                "INSERT INTO tutorials (title, content, difficulty, category) VALUES (?, ?, ?, ?)",
                &[title.into(), "c".into(), difficulty.into(), category.into()],
            )
            .await
            .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn difficulty_uses_fixed_rank() {
        let db = db().await;
        let levels: Vec<String> = Tutorial::difficulties(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.difficulty)
            .collect();
        assert_eq!(levels, ["beginner", "intermediate", "advanced", "expert"]);
    }

    #[tokio::test]
    async fn categories_ordered_by_count() {
        let db = db().await;
        let cats = Tutorial::categories(&db).await.unwrap();
        assert_eq!(cats[0], CategoryCount { category: "HTTP".into(), count: 3 });
        assert_eq!(cats[1].count, 2);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let db = db().await;
        let rows = Tutorial::list(&db, &TutorialFilter::default(), Page { page: 1, limit: 10 })
            .await
            .unwrap();
        assert_eq!(rows[0].title, "t5");
        let rows = Tutorial::list(
            &db,
            &TutorialFilter {
                difficulty: Some("beginner".into()),
                category: Some("HTTP".into()),
            },
            Page { page: 1, limit: 10 },
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 2);
    }
}

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;

use colsync::prelude::*;

pub const SCHEMA: &str = r#"
datasource db {
  provider = "mysql"
  url      = env("DATABASE_URL")
}

model User {
  id        Int      @id @default(autoincrement())
  email     String   @unique
  name      String   @map("full_name")
  bio       String?
  posts     Post[]
  createdAt DateTime @default(now()) @map("created_at")
  @@map("users")
}

model Post {
  id       Int    @id @default(autoincrement())
  title    String
  author   User   @relation(fields: [authorId], references: [id])
  authorId Int
}
"#;

pub fn schema() -> SchemaReader {
    SchemaReader::parse(SCHEMA)
}

pub fn schema_with_provider(provider: &str) -> SchemaReader {
    SchemaReader::parse(&SCHEMA.replace(r#"provider = "mysql""#, &format!("provider = \"{provider}\"")))
}

pub fn column(name: &str, definition: &str, position: u32) -> ColumnMetadata {
    ColumnMetadata {
        name: name.to_string(),
        definition: definition.to_string(),
        is_primary_key: name == "id",
        is_unique: false,
        is_auto_increment: definition.contains("AUTO_INCREMENT"),
        position,
    }
}

/// In-memory stand-in for a database, counting every query it answers.
#[derive(Default)]
pub struct FakeSource {
    tables: HashMap<String, Vec<ColumnMetadata>>,
    pub queries: Cell<usize>,
}

impl FakeSource {
    pub fn with_table(mut self, name: &str, columns: Vec<ColumnMetadata>) -> Self {
        self.tables.insert(name.to_string(), columns);
        self
    }
}

impl MetadataSource for FakeSource {
    async fn table_exists(&self, table: &str) -> Result<bool> {
        self.queries.set(self.queries.get() + 1);
        Ok(self.tables.contains_key(table))
    }

    async fn table_metadata(&self, table: &str) -> Result<TableMetadata> {
        self.queries.set(self.queries.get() + 1);
        let columns = self.tables.get(table).cloned().unwrap_or_default();
        Ok(TableMetadata::new(table, columns))
    }
}

/// Live `users` table with `created_at` first and `id` in the middle.
pub fn shuffled_users() -> Vec<ColumnMetadata> {
    vec![
        column("created_at", "datetime(3) NOT NULL DEFAULT CURRENT_TIMESTAMP(3)", 1),
        column("email", "varchar(191) NOT NULL", 2),
        column("id", "int NOT NULL AUTO_INCREMENT", 3),
        column("full_name", "varchar(191) NOT NULL", 4),
    ]
}

/// Live `Post` table already in declared order.
pub fn ordered_posts() -> Vec<ColumnMetadata> {
    vec![
        column("id", "int NOT NULL AUTO_INCREMENT", 1),
        column("title", "varchar(191) NOT NULL", 2),
        column("authorId", "int NOT NULL", 3),
    ]
}

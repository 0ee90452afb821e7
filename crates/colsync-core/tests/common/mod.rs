#![allow(dead_code)]

use colsync_core::{ColumnMetadata, SchemaAnalysis, SchemaReader};

pub const USER_SCHEMA: &str = r#"
datasource db {
  provider = "mysql"
  url      = env("DATABASE_URL")
}

model User {
  id        Int      @id @default(autoincrement())
  email     String   @unique
  name      String
  bio       String?  @db.Text
  posts     Post[]
  createdAt DateTime @default(now())
}

model Post {
  id       Int    @id @default(autoincrement())
  title    String
  author   User   @relation(fields: [authorId], references: [id])
  authorId Int
}

model t {
  id  Int @id
  new Int
}
"#;

pub fn reader() -> SchemaReader {
    let reader = SchemaReader::parse(USER_SCHEMA);
    assert!(
        reader.analysis().errors.is_empty(),
        "fixture schema has errors: {:?}",
        reader.analysis().errors
    );
    reader
}

pub fn analysis() -> SchemaAnalysis {
    reader().analysis().clone()
}

pub fn with_provider(provider: &str) -> SchemaAnalysis {
    SchemaAnalysis {
        provider: provider.to_string(),
        is_supported: false,
        ..analysis()
    }
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

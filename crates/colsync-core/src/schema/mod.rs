//! Schema definition model and reader.
//!
//! The reader understands Prisma-style schema files: a `datasource` block
//! naming the provider, `model` blocks listing fields in declaration order,
//! and `enum` blocks. Rename directives are honoured: `@map("col")` on a
//! field and `@@map("table")` on a model.
//!
//! ```rust
//! use colsync_core::schema::SchemaReader;
//!
//! let reader = SchemaReader::parse(r#"
//! datasource db {
//!   provider = "mysql"
//!   url      = env("DATABASE_URL")
//! }
//!
//! model User {
//!   id        Int      @id @default(autoincrement())
//!   email     String   @unique
//!   posts     Post[]
//!   createdAt DateTime @default(now()) @map("created_at")
//!   @@map("users")
//! }
//!
//! model Post {
//!   id     Int  @id
//!   author User @relation(fields: [authorId], references: [id])
//!   authorId Int
//! }
//! "#);
//!
//! assert_eq!(reader.table_name("User").unwrap(), "users");
//! assert_eq!(
//!     reader.column_order("User").unwrap(),
//!     vec!["id", "email", "created_at"]
//! );
//! ```

mod parser;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::provider::DatabaseProvider;

/// An attribute such as `@map("full_name")` or `@@index([email])`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name without the leading `@`/`@@` (e.g. `map`, `db.VarChar`).
    pub name: String,
    /// Raw text between the parentheses, if any.
    pub arguments: Option<String>,
}

impl Attribute {
    /// Returns the first double-quoted string in the arguments.
    ///
    /// Covers both `@map("x")` and `@map(name: "x")`.
    #[must_use]
    pub fn first_string_argument(&self) -> Option<String> {
        let args = self.arguments.as_deref()?;
        let open = args.find('"')?;
        let mut value = String::new();
        let mut chars = args[open + 1..].chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => value.push(chars.next()?),
                '"' => return Some(value),
                other => value.push(other),
            }
        }
        None
    }
}

/// A field declared on a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Logical field name.
    pub name: String,
    /// Physical column name (`@map`, defaults to the field name).
    pub column_name: String,
    /// Declared type without `?` / `[]` modifiers.
    pub field_type: String,
    /// Declared with `?`.
    pub is_optional: bool,
    /// Declared with `[]`.
    pub is_list: bool,
    /// Whether the field references another model (no physical column).
    pub is_relation: bool,
    /// Field attributes in declaration order.
    pub attributes: Vec<Attribute>,
}

/// A model declared in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model name.
    pub name: String,
    /// Physical table name (`@@map`, defaults to the model name).
    pub table_name: String,
    /// Fields in declaration order, relation fields included.
    pub fields: Vec<Field>,
    /// Block attributes (`@@map`, `@@index`, ...).
    pub attributes: Vec<Attribute>,
}

impl Model {
    /// Fields that have a physical column, in declaration order.
    pub fn column_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_relation)
    }

    /// Logical names of the non-relation fields.
    #[must_use]
    pub fn field_order(&self) -> Vec<String> {
        self.column_fields().map(|f| f.name.clone()).collect()
    }

    /// Physical column names of the non-relation fields.
    #[must_use]
    pub fn column_order(&self) -> Vec<String> {
        self.column_fields().map(|f| f.column_name.clone()).collect()
    }
}

/// Everything the engine needs to know about a schema file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaAnalysis {
    /// Provider string from the `datasource` block (empty if absent).
    pub provider: String,
    /// Models in declaration order.
    pub models: Vec<Model>,
    /// Enum names.
    pub enums: Vec<String>,
    /// Whether `provider` is one of the supported providers.
    pub is_supported: bool,
    /// Problems found while reading the schema.
    pub errors: Vec<String>,
}

impl SchemaAnalysis {
    /// Checks the provider and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedProvider`] for anything other than MySQL/MariaDB.
    pub fn provider(&self) -> Result<DatabaseProvider> {
        DatabaseProvider::parse(&self.provider)
    }

    /// Checks that the schema is usable: supported provider, no read errors.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedProvider`] first, then [`Error::InvalidSchema`].
    pub fn ensure_usable(&self) -> Result<DatabaseProvider> {
        let provider = self.provider()?;
        if !self.errors.is_empty() {
            return Err(Error::InvalidSchema(self.errors.clone()));
        }
        Ok(provider)
    }

    /// Looks up a model by its exact name.
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.iter().find(|m| m.name == name)
    }
}

/// Read access to a parsed schema, keyed by model name.
#[derive(Debug, Clone)]
pub struct SchemaReader {
    analysis: SchemaAnalysis,
}

impl SchemaReader {
    /// Parses schema text. Syntax problems are collected in
    /// [`SchemaAnalysis::errors`] rather than aborting the read.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        Self {
            analysis: parser::parse_schema(source),
        }
    }

    /// Wraps an already-built analysis.
    #[must_use]
    pub const fn from_analysis(analysis: SchemaAnalysis) -> Self {
        Self { analysis }
    }

    /// Returns the full analysis.
    #[must_use]
    pub const fn analysis(&self) -> &SchemaAnalysis {
        &self.analysis
    }

    /// Looks up a model.
    ///
    /// # Errors
    ///
    /// [`Error::ModelNotFound`] if no model has this name.
    pub fn model(&self, name: &str) -> Result<&Model> {
        self.analysis
            .model(name)
            .ok_or_else(|| Error::ModelNotFound(name.to_string()))
    }

    /// Non-relation field names of a model, in declaration order.
    ///
    /// # Errors
    ///
    /// [`Error::ModelNotFound`] if no model has this name.
    pub fn model_field_order(&self, model: &str) -> Result<Vec<String>> {
        Ok(self.model(model)?.field_order())
    }

    /// Physical column names of a model, in declaration order.
    ///
    /// # Errors
    ///
    /// [`Error::ModelNotFound`] if no model has this name.
    pub fn column_order(&self, model: &str) -> Result<Vec<String>> {
        Ok(self.model(model)?.column_order())
    }

    /// Field name → column name for every non-relation field.
    ///
    /// # Errors
    ///
    /// [`Error::ModelNotFound`] if no model has this name.
    pub fn field_column_mapping(&self, model: &str) -> Result<HashMap<String, String>> {
        Ok(self
            .model(model)?
            .column_fields()
            .map(|f| (f.name.clone(), f.column_name.clone()))
            .collect())
    }

    /// Physical table name of a model.
    ///
    /// # Errors
    ///
    /// [`Error::ModelNotFound`] if no model has this name.
    pub fn table_name(&self, model: &str) -> Result<String> {
        Ok(self.model(model)?.table_name.clone())
    }
}

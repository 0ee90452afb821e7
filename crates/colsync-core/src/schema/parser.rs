//! Line-oriented reader for Prisma-style schema files.

use std::collections::HashSet;

use super::{Attribute, Field, Model, SchemaAnalysis};
use crate::provider::DatabaseProvider;

/// A top-level `<kind> <name> { ... }` block.
struct Block {
    kind: String,
    name: String,
    line: usize,
    /// Logical lines (multi-line attribute arguments joined) with their
    /// starting line numbers.
    body: Vec<(usize, String)>,
}

/// Parses schema text into an analysis, collecting errors as it goes.
pub(super) fn parse_schema(source: &str) -> SchemaAnalysis {
    let mut errors = Vec::new();
    let blocks = split_blocks(source, &mut errors);

    let model_names: HashSet<&str> = blocks
        .iter()
        .filter(|b| b.kind == "model")
        .map(|b| b.name.as_str())
        .collect();

    let mut analysis = SchemaAnalysis::default();
    let mut seen_models = HashSet::new();

    for block in &blocks {
        match block.kind.as_str() {
            "datasource" => {
                if let Some(provider) = datasource_provider(block) {
                    analysis.provider = provider;
                }
            }
            "model" => {
                if !seen_models.insert(block.name.as_str()) {
                    errors.push(format!(
                        "line {}: model '{}' is declared more than once",
                        block.line, block.name
                    ));
                    continue;
                }
                analysis
                    .models
                    .push(parse_model(block, &model_names, &mut errors));
            }
            "enum" => analysis.enums.push(block.name.clone()),
            // No physical column order to reconcile.
            "generator" | "view" | "type" => {}
            other => errors.push(format!(
                "line {}: unknown block type '{other}'",
                block.line
            )),
        }
    }

    if analysis.provider.is_empty() {
        errors.push("no datasource block with a provider was found".to_string());
    }
    analysis.is_supported = DatabaseProvider::parse(&analysis.provider).is_ok();
    analysis.errors = errors;
    analysis
}

/// Removes a `//` comment, ignoring `//` inside string literals.
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '/' if !in_string && line[i + 1..].starts_with('/') => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Net change in bracket depth over a line, ignoring brackets in strings.
fn depth_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut in_string = false;
    let mut escaped = false;
    for c in line.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '(' | '[' if !in_string => delta += 1,
            ')' | ']' if !in_string => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// Groups the file into top-level blocks.
fn split_blocks(source: &str, errors: &mut Vec<String>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;
    let mut pending: Option<(usize, String)> = None;
    let mut depth = 0;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        let Some(block) = current.as_mut() else {
            match line.strip_suffix('{').map(str::split_whitespace) {
                Some(mut words) => match (words.next(), words.next(), words.next()) {
                    (Some(kind), Some(name), None) => {
                        current = Some(Block {
                            kind: kind.to_string(),
                            name: name.to_string(),
                            line: line_no,
                            body: Vec::new(),
                        });
                    }
                    _ => errors.push(format!("line {line_no}: malformed block header")),
                },
                None => errors.push(format!(
                    "line {line_no}: unexpected content outside a block"
                )),
            }
            continue;
        };

        if pending.is_none() && line == "}" {
            if let Some(done) = current.take() {
                blocks.push(done);
            }
            continue;
        }

        let (start, mut text) = pending.take().unwrap_or((line_no, String::new()));
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(line);
        depth += depth_delta(line);

        if depth > 0 {
            pending = Some((start, text));
        } else {
            depth = 0;
            block.body.push((start, text));
        }
    }

    if let Some(open) = current {
        errors.push(format!(
            "line {}: {} '{}' is never closed",
            open.line, open.kind, open.name
        ));
    }
    blocks
}

/// Reads `provider = "..."` from a datasource block.
fn datasource_provider(block: &Block) -> Option<String> {
    block.body.iter().find_map(|(_, line)| {
        let (key, value) = line.split_once('=')?;
        if key.trim() != "provider" {
            return None;
        }
        let value = value.trim();
        value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .map(str::to_string)
    })
}

/// Splits off one whitespace-delimited word, keeping parenthesised text
/// (e.g. `Unsupported("point")` or `@default(now())`) together.
fn take_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    let mut depth = 0;
    let mut in_string = false;
    for (i, c) in input.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '(' if !in_string => depth += 1,
            ')' if !in_string => depth -= 1,
            c if c.is_whitespace() && depth <= 0 && !in_string => {
                return (&input[..i], &input[i..]);
            }
            _ => {}
        }
    }
    (input, "")
}

/// Parses a sequence of `@attr` / `@@attr` items.
fn parse_attributes(mut rest: &str, prefix: &str) -> Result<Vec<Attribute>, String> {
    let mut attributes = Vec::new();
    loop {
        let (word, tail) = take_word(rest);
        if word.is_empty() {
            return Ok(attributes);
        }
        rest = tail;

        let body = word
            .strip_prefix(prefix)
            .filter(|b| !b.starts_with('@'))
            .ok_or_else(|| format!("expected attribute, found '{word}'"))?;
        let attribute = match body.split_once('(') {
            Some((name, args)) => Attribute {
                name: name.to_string(),
                arguments: Some(args.strip_suffix(')').unwrap_or(args).to_string()),
            },
            None => Attribute {
                name: body.to_string(),
                arguments: None,
            },
        };
        attributes.push(attribute);
    }
}

fn parse_model(block: &Block, model_names: &HashSet<&str>, errors: &mut Vec<String>) -> Model {
    let mut model = Model {
        name: block.name.clone(),
        table_name: block.name.clone(),
        fields: Vec::new(),
        attributes: Vec::new(),
    };
    let mut seen_fields = HashSet::new();

    for (line_no, line) in &block.body {
        if line.starts_with("@@") {
            match parse_attributes(line, "@@") {
                Ok(attrs) => model.attributes.extend(attrs),
                Err(message) => errors.push(format!("line {line_no}: {message}")),
            }
            continue;
        }

        match parse_field(line, model_names) {
            Ok(field) => {
                if !seen_fields.insert(field.name.clone()) {
                    errors.push(format!(
                        "line {line_no}: field '{}' is declared more than once in model '{}'",
                        field.name, model.name
                    ));
                    continue;
                }
                model.fields.push(field);
            }
            Err(message) => errors.push(format!("line {line_no}: {message}")),
        }
    }

    if let Some(table) = model
        .attributes
        .iter()
        .find(|a| a.name == "map")
        .and_then(Attribute::first_string_argument)
    {
        model.table_name = table;
    }
    model
}

fn parse_field(line: &str, model_names: &HashSet<&str>) -> Result<Field, String> {
    let (name, rest) = take_word(line);
    let (raw_type, rest) = take_word(rest);
    if raw_type.is_empty() {
        return Err(format!("field '{name}' has no type"));
    }
    if !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!("invalid field name '{name}'"));
    }

    let (field_type, is_optional, is_list) = if let Some(t) = raw_type.strip_suffix("[]") {
        (t, false, true)
    } else if let Some(t) = raw_type.strip_suffix('?') {
        (t, true, false)
    } else {
        (raw_type, false, false)
    };

    let attributes = parse_attributes(rest, "@")?;
    let is_relation =
        model_names.contains(field_type) || attributes.iter().any(|a| a.name == "relation");
    let column_name = attributes
        .iter()
        .find(|a| a.name == "map")
        .and_then(Attribute::first_string_argument)
        .unwrap_or_else(|| name.to_string());

    Ok(Field {
        name: name.to_string(),
        column_name,
        field_type: field_type.to_string(),
        is_optional,
        is_list,
        is_relation,
        attributes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("id Int // primary"), "id Int ");
        assert_eq!(
            strip_comment(r#"url = "mysql://a//b""#),
            r#"url = "mysql://a//b""#
        );
    }

    #[test]
    fn test_parse_full_schema() {
        let analysis = parse_schema(
            r#"
// comment line
generator client {
  provider = "prisma-client-js"
}

datasource db {
  provider = "mariadb"
  url      = env("DATABASE_URL")
}

enum Role {
  USER
  ADMIN
}

model Post {
  id        Int      @id @default(autoincrement())
  title     String   @db.VarChar(255)
  role      Role     @default(USER)
  author    User     @relation(fields: [authorId], references: [id], onDelete: Cascade)
  authorId  Int      @map("author_id")
  location  Unsupported("point")?

  @@index([authorId,
          title])
  @@map("posts")
}

model User {
  id    Int    @id
  posts Post[]
}
"#,
        );

        assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
        assert_eq!(analysis.provider, "mariadb");
        assert!(analysis.is_supported);
        assert_eq!(analysis.enums, vec!["Role"]);

        let post = analysis.model("Post").unwrap();
        assert_eq!(post.table_name, "posts");
        assert_eq!(
            post.column_order(),
            vec!["id", "title", "role", "author_id", "location"]
        );
        assert_eq!(post.attributes.len(), 2);

        let location = &post.fields[5];
        assert_eq!(location.field_type, r#"Unsupported("point")"#);
        assert!(location.is_optional);

        let user = analysis.model("User").unwrap();
        assert!(user.fields[1].is_relation);
        assert!(user.fields[1].is_list);
    }

    #[test]
    fn test_missing_provider_and_bad_lines() {
        let analysis = parse_schema(
            r"
model A {
  id
}
stray text
",
        );
        assert!(!analysis.is_supported);
        assert_eq!(analysis.errors.len(), 3, "{:?}", analysis.errors);
        assert!(analysis.errors[0].contains("outside a block"));
        assert!(analysis.errors[1].contains("has no type"));
        assert!(analysis.errors[2].contains("no datasource"));
    }

    #[test]
    fn test_duplicate_field() {
        let analysis = parse_schema(
            r#"
datasource db {
  provider = "mysql"
}
model A {
  id Int @id
  id String
}
"#,
        );
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].contains("more than once"));
    }

    #[test]
    fn test_unclosed_block() {
        let analysis = parse_schema("datasource db {\n  provider = \"mysql\"\n");
        assert!(analysis.errors[0].contains("never closed"));
    }
}

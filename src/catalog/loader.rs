use super::Course;
use crate::{DESCRIPTION_COLUMN, KEYWORD_COLUMN, TITLE_COLUMN};
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// Header names of the columns a composite course document is built from.
#[derive(Clone, Debug, PartialEq)]
pub struct Columns {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

impl Columns {
    pub fn from_env() -> Self {
        Self {
            title: TITLE_COLUMN.clone(),
            description: DESCRIPTION_COLUMN.clone(),
            keywords: KEYWORD_COLUMN.clone(),
        }
    }
}

pub fn load_courses(path: impl AsRef<Path>, columns: &Columns) -> Result<Vec<Course>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open course catalog {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header of {}", path.display()))?
        .clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| anyhow!("course catalog {} has no column {:?}", path.display(), name))
    };
    let title = position(&columns.title)?;
    let description = position(&columns.description)?;
    let keywords = position(&columns.keywords)?;

    let mut courses = vec![];
    for (ordinal, record) in reader.records().enumerate() {
        // csv counts the header as line 1
        let record = record.with_context(|| {
            format!("malformed course row {} in {}", ordinal + 2, path.display())
        })?;
        let field = |i: usize| record.get(i).unwrap_or("").to_string();
        let raw_fields = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>();
        courses.push(Course {
            ordinal,
            title: field(title),
            description: field(description),
            keywords: field(keywords),
            raw_fields,
        });
    }
    info!("loaded {} courses from {}", courses.len(), path.display());

    Ok(courses)
}

//! OpenAlex `/works` response shapes and their mapping to domain records.
//!
//! Only the fields the pipeline uses are decoded. OpenAlex sends `null` for
//! many absent values, so every field is optional on the wire.

use pipeline::{PaperRecord, SearchMeta, SearchResponse};
use serde::de::{Error as _, Unexpected};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct WorksResponse {
    #[serde(default)]
    meta: Option<WorksMeta>,
    #[serde(default)]
    results: Option<Vec<Work>>,
}

#[derive(Debug, Deserialize)]
struct WorksMeta {
    count: Option<u64>,
    page: Option<u32>,
    per_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Work {
    title: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i32>,
    cited_by_count: Option<u64>,
    doi: Option<String>,
    #[serde(default)]
    authorships: Option<Vec<Authorship>>,
}

#[derive(Debug, Deserialize)]
struct Authorship {
    author: Option<DisplayNamed>,
    #[serde(default)]
    institutions: Option<Vec<DisplayNamed>>,
}

#[derive(Debug, Deserialize)]
struct DisplayNamed {
    display_name: Option<String>,
}

impl WorksResponse {
    /// Decodes a `/works` body. Anything other than a JSON object is
    /// rejected, including arrays that would otherwise decode field by field.
    pub(crate) fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        let unexpected = match &value {
            Value::Object(_) => return serde_json::from_value(value),
            Value::Array(_) => Unexpected::Seq,
            Value::Null => Unexpected::Unit,
            Value::Bool(b) => Unexpected::Bool(*b),
            Value::Number(_) => Unexpected::Other("number"),
            Value::String(s) => Unexpected::Str(s),
        };
        Err(serde_json::Error::invalid_type(unexpected, &"a JSON object"))
    }

    pub(crate) fn into_search_response(self) -> SearchResponse {
        let meta = self
            .meta
            .map(|m| SearchMeta {
                total_matches: m.count,
                page: m.page,
                page_size: m.per_page,
            })
            .unwrap_or_default();

        SearchResponse {
            papers: self
                .results
                .unwrap_or_default()
                .into_iter()
                .map(Work::into_record)
                .collect(),
            meta,
        }
    }
}

impl Work {
    fn into_record(self) -> PaperRecord {
        let authorships = self.authorships.unwrap_or_default();

        let authors = authorships
            .iter()
            .filter_map(|a| a.author.as_ref()?.display_name.clone())
            .collect();

        let institutions = authorships
            .iter()
            .flat_map(|a| a.institutions.iter().flatten())
            .filter_map(|i| i.display_name.clone())
            .collect();

        PaperRecord {
            title: self.title.or(self.display_name).unwrap_or_default(),
            year: self.publication_year,
            citation_count: self.cited_by_count.unwrap_or(0),
            authors,
            institutions,
            doi: self.doi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_authorships_to_authors_and_institutions() {
        let body = r#"{
            "meta": {"count": 1234, "page": 1, "per_page": 50},
            "results": [{
                "title": "Superconducting qubits",
                "publication_year": 2020,
                "cited_by_count": 812,
                "doi": "https://doi.org/10.1000/xyz",
                "authorships": [
                    {"author": {"display_name": "Ada Lovelace"},
                     "institutions": [{"display_name": "ETH Zurich"}, {"display_name": "IBM"}]},
                    {"author": {"display_name": "Alan Turing"}, "institutions": []},
                    {"author": null, "institutions": null}
                ]
            }]
        }"#;
        let response = WorksResponse::from_json(body).unwrap();
        let response = response.into_search_response();

        assert_eq!(response.meta.total_matches, Some(1234));
        assert_eq!(response.meta.page_size, Some(50));
        let paper = &response.papers[0];
        assert_eq!(paper.title, "Superconducting qubits");
        assert_eq!(paper.year, Some(2020));
        assert_eq!(paper.citation_count, 812);
        assert_eq!(paper.authors, vec!["Ada Lovelace", "Alan Turing"]);
        assert_eq!(paper.institutions, vec!["ETH Zurich", "IBM"]);
        assert_eq!(paper.doi.as_deref(), Some("https://doi.org/10.1000/xyz"));
    }

    #[test]
    fn null_fields_fall_back() {
        let body = r#"{"results": [{"title": null, "display_name": "Fallback name",
            "publication_year": null, "cited_by_count": null, "doi": null, "authorships": null}]}"#;
        let response = WorksResponse::from_json(body).unwrap();
        let response = response.into_search_response();

        assert_eq!(response.meta, SearchMeta::default());
        let paper = &response.papers[0];
        assert_eq!(paper.title, "Fallback name");
        assert_eq!(paper.year, None);
        assert_eq!(paper.citation_count, 0);
        assert!(paper.authors.is_empty() && paper.institutions.is_empty());
    }

    #[test]
    fn empty_object_is_an_empty_response() {
        let response = WorksResponse::from_json("{}").unwrap();
        assert_eq!(response.into_search_response(), SearchResponse::default());
    }

    #[test]
    fn top_level_must_be_an_object() {
        for body in ["[]", "[null, null]", "null", "42", "\"works\"", "true"] {
            let err = WorksResponse::from_json(body).unwrap_err();
            assert!(err.to_string().contains("a JSON object"), "{body}: {err}");
        }
    }
}

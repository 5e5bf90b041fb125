//! Output formatting for query results

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::Serialize;
use starquery_core::Arg;

use crate::item::{Item, QueryResult};

/// Supported output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One name per line
    #[default]
    Name,
    /// `//file:line: name`
    Location,
    Json,
    /// Number of items
    Count,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" | "" => Ok(OutputFormat::Name),
            "location" => Ok(OutputFormat::Location),
            "json" => Ok(OutputFormat::Json),
            "count" => Ok(OutputFormat::Count),
            other => Err(format!(
                "unknown output format: {other:?} (valid: name, location, json, count)"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Name => "name",
            OutputFormat::Location => "location",
            OutputFormat::Json => "json",
            OutputFormat::Count => "count",
        })
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    query: &'a str,
    count: usize,
    results: Vec<JsonItem<'a>>,
}

#[derive(Serialize)]
struct JsonItem<'a> {
    #[serde(rename = "type")]
    item_type: &'static str,
    name: &'a str,
    file: &'a str,
    line: u32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    params: &'a [String],
    #[serde(skip_serializing_if = "str::is_empty")]
    docstring: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    module: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbols: Option<&'a BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "str::is_empty")]
    function: &'a str,
    #[serde(skip_serializing_if = "<[Arg]>::is_empty")]
    args: &'a [Arg],
}

impl<'a> JsonItem<'a> {
    fn new(item: &'a Item) -> Self {
        let mut json = JsonItem {
            item_type: item.item_type().as_str(),
            name: item.name(),
            file: item.file(),
            line: item.line(),
            params: &[],
            docstring: "",
            module: "",
            symbols: None,
            function: "",
            args: &[],
        };
        match item {
            Item::Def(def) => {
                json.params = &def.params;
                json.docstring = &def.docstring;
            }
            Item::Load(load) => {
                json.module = &load.module;
                json.symbols = (!load.symbols.is_empty()).then_some(&load.symbols);
            }
            Item::Call(call) => {
                json.function = &call.function;
                json.args = &call.args;
            }
            Item::File(_) | Item::Assign(_) => {}
        }
        json
    }
}

/// Writes query results in one [`OutputFormat`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Write `result` for the query text `query`. Output is sorted so the
    /// same result always renders the same way.
    pub fn write<W: Write>(&self, w: &mut W, query: &str, result: &QueryResult) -> io::Result<()> {
        match self.format {
            OutputFormat::Name => {
                for item in sorted_by_file_line_name(result) {
                    writeln!(w, "{}", item.name())?;
                }
            }
            OutputFormat::Location => {
                let mut items: Vec<&Item> = result.iter().collect();
                items.sort_by(|a, b| (a.file(), a.line()).cmp(&(b.file(), b.line())));
                for item in items {
                    writeln!(w, "//{}:{}: {}", item.file(), item.line(), item.name())?;
                }
            }
            OutputFormat::Json => {
                let results: Vec<JsonItem<'_>> = sorted_by_file_line_name(result)
                    .into_iter()
                    .map(JsonItem::new)
                    .collect();
                let output = JsonOutput {
                    query,
                    count: results.len(),
                    results,
                };
                serde_json::to_writer_pretty(&mut *w, &output)?;
                writeln!(w)?;
            }
            OutputFormat::Count => writeln!(w, "{}", result.len())?,
        }
        Ok(())
    }
}

fn sorted_by_file_line_name(result: &QueryResult) -> Vec<&Item> {
    let mut items: Vec<&Item> = result.iter().collect();
    items.sort_by(|a, b| {
        (a.file(), a.line(), a.name()).cmp(&(b.file(), b.line(), b.name()))
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use starquery_core::{Call, Def, Load};

    fn sample() -> QueryResult {
        QueryResult::from(vec![
            Item::Def(Def {
                name: "zeta".into(),
                file: "lib/b.bzl".into(),
                line: 3,
                params: vec!["name".into(), "**kwargs".into()],
                docstring: "Does zeta.".into(),
            }),
            Item::Def(Def {
                name: "alpha".into(),
                file: "lib/b.bzl".into(),
                line: 1,
                params: vec![],
                docstring: String::new(),
            }),
            Item::Call(Call {
                function: "cc_library".into(),
                args: vec![Arg::keyword("name", "x")],
                file: "lib/a/BUILD".into(),
                line: 7,
            }),
        ])
    }

    fn render(format: OutputFormat, result: &QueryResult) -> String {
        let mut out = Vec::new();
        Formatter::new(format).write(&mut out, "q", result).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("".parse::<OutputFormat>(), Ok(OutputFormat::Name));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().unwrap_err().contains("valid: name"));
    }

    #[test]
    fn test_name_and_location() {
        let result = sample();
        assert_eq!(
            render(OutputFormat::Name, &result),
            "cc_library\nalpha\nzeta\n"
        );
        assert_eq!(
            render(OutputFormat::Location, &result),
            "//lib/a/BUILD:7: cc_library\n//lib/b.bzl:1: alpha\n//lib/b.bzl:3: zeta\n"
        );
    }

    #[test]
    fn test_count() {
        assert_eq!(render(OutputFormat::Count, &sample()), "3\n");
        assert_eq!(render(OutputFormat::Count, &QueryResult::new()), "0\n");
        assert_eq!(render(OutputFormat::Name, &QueryResult::new()), "");
    }

    #[test]
    fn test_json() {
        let mut symbols = BTreeMap::new();
        symbols.insert("foo".to_string(), "foo".to_string());
        let mut items = sample().into_items();
        items.push(Item::Load(Load {
            module: "//lib:b.bzl".into(),
            symbols,
            file: "lib/a/BUILD".into(),
            line: 1,
        }));
        let rendered = render(OutputFormat::Json, &QueryResult::from(items));
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(value["query"], "q");
        assert_eq!(value["count"], 4);
        let results = value["results"].as_array().unwrap();
        assert_eq!(results[0]["type"], "load");
        assert_eq!(results[0]["module"], "//lib:b.bzl");
        assert_eq!(results[0]["symbols"]["foo"], "foo");
        assert_eq!(results[1]["type"], "call");
        assert_eq!(results[1]["function"], "cc_library");
        assert_eq!(results[1]["args"][0]["name"], "name");
        assert_eq!(results[2]["name"], "alpha");
        assert!(results[2].get("params").is_none());
        assert!(results[2].get("docstring").is_none());
        assert_eq!(results[3]["params"][1], "**kwargs");
        assert_eq!(results[3]["docstring"], "Does zeta.");
    }

    #[test]
    fn test_json_empty() {
        let rendered = render(OutputFormat::Json, &QueryResult::new());
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["count"], 0);
        assert_eq!(value["results"].as_array().unwrap().len(), 0);
    }
}

//! End-to-end integration tests for httpfile
//!
//! These tests drive complete workflows: reading `.http` files from disk,
//! parsing them, linting them and resolving their placeholders.

use super::{create_temp_http_file, init_test_env};
use httpfile::config::load_options;
use httpfile::models::{ExpectationKind, TextEncoding};
use httpfile::parser::{parse, parse_file, parse_with_options, HttpFileParser};
use httpfile::validation::Validator;
use httpfile::variables::{extract_references, VariableContext};
use httpfile::{ParseError, ParserOptions};
use serde_json::json;

const SAMPLE: &str = r##"@hostname = api.example.com
@baseUrl = https://{{hostname}}
@contentType = application/json

### Get users
# @name listUsers
# @expect status 200
# @expect header Content-Type: application/json
GET {{baseUrl}}/users
    ?page=1
    &limit=10
Accept: {{contentType}}

###

# @name createUser
# @expect status 201
# @expect body-path $.id
POST {{baseUrl}}/users HTTP/1.1
Content-Type: {{contentType}}

{
  "name": "Ada",
  "tags": ["<@ not a directive", "# not a comment"]
}

### upload
PUT {{baseUrl}}/users/1/avatar
Content-Type: image/png

< ./avatar one.png
"##;

#[test]
fn test_end_to_end_parse_sample_file() {
    init_test_env();
    let (_temp_dir, file_path) = create_temp_http_file("sample.http", SAMPLE);

    let document = parse_file(&file_path, &ParserOptions::default()).unwrap();

    let names: Vec<&str> = document.requests().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["listUsers", "createUser", "upload"]);

    let lines: Vec<usize> = document.requests().iter().map(|r| r.source_line).collect();
    assert_eq!(lines, vec![9, 19, 28]);

    let list = document.request("listUsers").unwrap();
    assert_eq!(list.url, "{{baseUrl}}/users?page=1&limit=10");
    assert_eq!(list.metadata.expectations.len(), 2);
    assert_eq!(list.metadata.expectations[1].kind, ExpectationKind::Header);
    assert_eq!(
        list.metadata.expectations[1].value,
        "Content-Type: application/json"
    );

    let create = document.request("createUser").unwrap();
    assert_eq!(create.http_version.as_deref(), Some("HTTP/1.1"));
    assert!(create.file_body.is_none());
    let body = create.body.as_deref().unwrap();
    assert!(body.contains("<@ not a directive"));
    assert!(body.contains("# not a comment"));
    assert!(body.starts_with('{') && body.ends_with('}'));

    let upload = document.request("upload").unwrap();
    assert_eq!(upload.method, "PUT");
    assert!(upload.body.is_none());
    let reference = upload.file_body.as_ref().unwrap();
    assert_eq!(reference.file_path, "./avatar one.png");
    assert!(!reference.process_variables);
    assert_eq!(reference.encoding, None);
}

#[test]
fn test_end_to_end_lint_and_resolve() {
    init_test_env();
    let document = parse(SAMPLE).unwrap();

    let result = Validator::default().validate(&document);
    assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
    assert!(!result.has_warnings(), "unexpected warnings: {:?}", result.warnings);

    let context = VariableContext::from_document(&document);
    let list = &document.requests()[0];
    assert_eq!(
        context.resolve(&list.url),
        "https://api.example.com/users?page=1&limit=10"
    );
    assert_eq!(context.resolve(&list.headers["Accept"]), "application/json");

    let refs = extract_references(&document.requests()[1].url);
    assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec!["baseUrl"]);
}

#[test]
fn test_end_to_end_crlf_and_bom() {
    init_test_env();
    let content = "\u{feff}@base = http://x\r\n\r\n# @name r\r\nGET {{base}}/y HTTP/1.1\r\nAccept: */*\r\n";
    let (_temp_dir, file_path) = create_temp_http_file("windows.http", content);

    let document = HttpFileParser::default().parse_file(&file_path).unwrap();
    assert_eq!(document.variables()["base"], "http://x");
    assert_eq!(document.requests()[0].headers["Accept"], "*/*");
    assert_eq!(document.requests()[0].source_line, 4);
}

#[test]
fn test_end_to_end_options_from_settings() {
    init_test_env();
    let settings = json!({
        "http-file": {
            "strictMode": true,
            "parseExpectations": false
        }
    });
    let options = load_options(Some(settings)).unwrap();

    // Expectations are skipped, so the bad status never reaches the validator.
    let content = "# @name ok\n# @expect status 999\nGET https://x\n";
    let document = parse_with_options(content, &options).unwrap();
    assert!(document.requests()[0].metadata.expectations.is_empty());

    let err = parse_with_options("# @name bad name\nGET https://x\n", &options).unwrap_err();
    assert!(matches!(err, ParseError::Validation { .. }));
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_end_to_end_file_body_forms() {
    init_test_env();
    let content = "\
POST https://x/raw
Content-Type: text/plain

<   C:\\data\\my file.txt

###

POST https://x/vars

<@ ./template.json

###

POST https://x/latin

<@latin1 ./data.txt
";

    let document = parse(content).unwrap();
    let references: Vec<_> = document
        .requests()
        .iter()
        .map(|r| r.file_body.clone().unwrap())
        .collect();

    assert_eq!(references[0].file_path, "C:\\data\\my file.txt");
    assert!(!references[0].process_variables);

    assert_eq!(references[1].file_path, "./template.json");
    assert!(references[1].process_variables);
    assert_eq!(references[1].encoding, Some(TextEncoding::Utf8));

    assert_eq!(references[2].file_path, "./data.txt");
    assert_eq!(references[2].encoding, Some(TextEncoding::Latin1));
    assert_eq!(references[2].encoding.unwrap().name(), "ISO-8859-1");
}

#[test]
fn test_end_to_end_document_serializes() {
    init_test_env();
    let document = parse(SAMPLE).unwrap();

    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(value["requests"][1]["name"], "createUser");
    assert_eq!(value["variables"]["hostname"], "api.example.com");
}

#[test]
fn test_end_to_end_missing_file() {
    let err = parse_file("does/not/exist.http", &ParserOptions::default()).unwrap_err();
    assert!(err.to_string().contains("does/not/exist.http"));
    assert_eq!(err.line(), None);
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_end_to_end_async_parse() {
    use httpfile::parser::parse_file_async;

    init_test_env();
    let (_temp_dir, file_path) = create_temp_http_file("async.http", SAMPLE);

    let document = parse_file_async(&file_path, &ParserOptions::default())
        .await
        .unwrap();
    assert_eq!(document.len(), 3);

    let err = parse_file_async("", &ParserOptions::default()).await.unwrap_err();
    assert!(matches!(err, ParseError::EmptyPath));
}

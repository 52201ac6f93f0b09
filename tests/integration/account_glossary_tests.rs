/*!
 * Integration tests for glossaries, usage and supported languages
 */

use tokio_util::sync::CancellationToken;

use deepl_client::errors::DeepLError;
use deepl_client::translation::GlossaryEntries;

use crate::common::mock_transport::{MockReply, MockTransport};
use crate::common::{fast_options, translator_with};

const GLOSSARY_JSON: &str = r#"{
    "glossary_id": "g-1",
    "name": "Menu",
    "ready": true,
    "source_lang": "en",
    "target_lang": "de",
    "creation_time": "2024-05-01T10:00:00Z",
    "entry_count": 2
}"#;

#[tokio::test]
async fn test_getUsage_withDocumentLimit_shouldReportLimitReached() {
    let transport = MockTransport::sequence(vec![MockReply::ok(
        r#"{"character_count": 120, "character_limit": 500000,
            "document_count": 10, "document_limit": 10}"#,
    )]);
    let translator = translator_with(&transport, fast_options());

    let usage = translator.get_usage(&CancellationToken::new()).await.unwrap();

    assert_eq!(usage.character.map(|c| c.count), Some(120));
    assert!(usage.document.is_some_and(|d| d.limit_reached()));
    assert!(usage.team_document.is_none());
    assert!(usage.any_limit_reached());
    assert_eq!(transport.requests()[0].request.path, "/v2/usage");
}

#[tokio::test]
async fn test_getTargetLanguages_shouldQueryByType() {
    let transport = MockTransport::sequence(vec![MockReply::ok(
        r#"[{"language": "DE", "name": "German", "supports_formality": true}]"#,
    )]);
    let translator = translator_with(&transport, fast_options());

    let languages = translator
        .get_target_languages(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(languages.len(), 1);
    assert_eq!(languages[0].code, "DE");
    let request = &transport.requests()[0].request;
    assert_eq!(request.path, "/v2/languages");
    assert_eq!(request.query, vec![("type".to_string(), "target".to_string())]);
}

#[tokio::test]
async fn test_createGlossary_shouldSendEntriesAsTsv() {
    let transport = MockTransport::sequence(vec![MockReply::Response(201, GLOSSARY_JSON.to_string())]);
    let translator = translator_with(&transport, fast_options());
    let mut entries = GlossaryEntries::new();
    entries.insert("starter", "Vorspeise").unwrap();
    entries.insert("dessert", "Nachtisch").unwrap();

    let info = translator
        .create_glossary("Menu", "en", "de", &entries, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(info.glossary_id, "g-1");
    assert_eq!(info.entry_count, 2);
    let request = &transport.requests()[0].request;
    assert_eq!(request.path, "/v2/glossaries");
    assert_eq!(request.field("entries_format"), Some("tsv"));
    assert_eq!(request.field("entries"), Some("starter\tVorspeise\ndessert\tNachtisch"));
}

#[tokio::test]
async fn test_createGlossary_withoutEntries_shouldFailWithoutRequest() {
    let transport = MockTransport::sequence(vec![MockReply::ok(GLOSSARY_JSON)]);
    let translator = translator_with(&transport, fast_options());

    let error = translator
        .create_glossary("Menu", "en", "de", &GlossaryEntries::new(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(error, DeepLError::InvalidArgument(_)));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_listGlossaries_shouldParseAll() {
    let body = format!(r#"{{"glossaries": [{}]}}"#, GLOSSARY_JSON);
    let transport = MockTransport::sequence(vec![MockReply::ok(body)]);
    let translator = translator_with(&transport, fast_options());

    let glossaries = translator
        .list_glossaries(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(glossaries.len(), 1);
    assert_eq!(glossaries[0].name, "Menu");
}

#[tokio::test]
async fn test_getGlossary_missing_shouldReturnGlossaryNotFound() {
    let transport = MockTransport::sequence(vec![MockReply::status(404)]);
    let translator = translator_with(&transport, fast_options());

    let error = translator
        .get_glossary("nope", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(error, DeepLError::GlossaryNotFound(_)), "{error:?}");
}

#[tokio::test]
async fn test_getGlossaryEntries_shouldRequestTsvAndParse() {
    let transport =
        MockTransport::sequence(vec![MockReply::ok("starter\tVorspeise\ndessert\tNachtisch")]);
    let translator = translator_with(&transport, fast_options());

    let entries = translator
        .get_glossary_entries("g-1", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries.get("dessert"), Some("Nachtisch"));
    let request = &transport.requests()[0].request;
    assert_eq!(request.path, "/v2/glossaries/g-1/entries");
    assert!(
        request
            .headers
            .contains(&("Accept".to_string(), "text/tab-separated-values".to_string()))
    );
}

#[tokio::test]
async fn test_deleteGlossary_shouldSendDelete() {
    let transport = MockTransport::sequence(vec![MockReply::status(204)]);
    let translator = translator_with(&transport, fast_options());

    translator
        .delete_glossary("g-1", &CancellationToken::new())
        .await
        .unwrap();

    let request = &transport.requests()[0].request;
    assert_eq!(request.method, reqwest::Method::DELETE);
    assert_eq!(request.path, "/v2/glossaries/g-1");
}

#[tokio::test]
async fn test_getGlossaryLanguagePairs_shouldParsePairs() {
    let transport = MockTransport::sequence(vec![MockReply::ok(
        r#"{"supported_languages": [{"source_lang": "en", "target_lang": "de"},
                                    {"source_lang": "de", "target_lang": "en"}]}"#,
    )]);
    let translator = translator_with(&transport, fast_options());

    let pairs = translator
        .get_glossary_language_pairs(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(pairs.len(), 2);
    assert_eq!(pairs[1].source_lang, "de");
}

//! End-to-end scenarios driving a [`pathjson::Parser`] through its public
//! subscription API over chunked input.

use futures::stream;
use pathjson::{Emission, Error, Parser, ParserOptions, Path, ValueKind};

fn chunked(text: &str, size: usize) -> Vec<Result<String, std::io::Error>> {
    text.chars()
        .collect::<Vec<_>>()
        .chunks(size)
        .map(|c| Ok(c.iter().collect()))
        .collect()
}

async fn run_chunked(parser: &Parser, text: &str, size: usize) {
    let engine = parser.engine();
    engine.run(stream::iter(chunked(text, size))).await;
}

#[tokio::test]
async fn flat_object_fields_resolve_independently() {
    let parser = Parser::new(ParserOptions::default());
    let name = parser
        .subscribe(&Path::parse("name").unwrap(), ValueKind::String)
        .unwrap();
    let age = parser
        .subscribe(&Path::parse("age").unwrap(), ValueKind::Number)
        .unwrap();
    let active = parser
        .subscribe(&Path::parse("active").unwrap(), ValueKind::Boolean)
        .unwrap();
    let root = parser.subscribe(&Path::root(), ValueKind::Object).unwrap();

    run_chunked(
        &parser,
        r#"{"name":"Alice","age":30,"active":true}"#,
        10,
    )
    .await;

    assert_eq!(
        name.await_final().await.unwrap(),
        pathjson::JsonValue::String("Alice".into())
    );
    assert_eq!(
        age.await_final().await.unwrap(),
        pathjson::JsonValue::Number(30.0)
    );
    assert_eq!(
        active.await_final().await.unwrap(),
        pathjson::JsonValue::Boolean(true)
    );
    let root_map = root.await_final().await.unwrap();
    let map = root_map.as_object().unwrap();
    assert_eq!(map["name"], pathjson::JsonValue::String("Alice".into()));
    assert_eq!(map["age"], pathjson::JsonValue::Number(30.0));
    assert_eq!(map["active"], pathjson::JsonValue::Boolean(true));
}

#[tokio::test]
async fn deeply_nested_array_elements_resolve_by_path() {
    let parser = Parser::new(ParserOptions::default());
    let e0 = parser
        .subscribe(&Path::parse("outer[0].inner[0]").unwrap(), ValueKind::Number)
        .unwrap();
    let e1 = parser
        .subscribe(&Path::parse("outer[0].inner[1]").unwrap(), ValueKind::Number)
        .unwrap();
    let e2 = parser
        .subscribe(&Path::parse("outer[0].inner[2]").unwrap(), ValueKind::Number)
        .unwrap();

    run_chunked(&parser, r#"{"outer":[{"inner":[1,2,3]}]}"#, 15).await;

    assert_eq!(e0.await_final().await.unwrap(), pathjson::JsonValue::Number(1.0));
    assert_eq!(e1.await_final().await.unwrap(), pathjson::JsonValue::Number(2.0));
    assert_eq!(e2.await_final().await.unwrap(), pathjson::JsonValue::Number(3.0));
}

#[tokio::test]
async fn string_chunks_concatenate_to_final_value_across_an_escape_boundary() {
    let parser = Parser::new(ParserOptions::default());
    let text = parser
        .subscribe(&Path::parse("text").unwrap(), ValueKind::String)
        .unwrap();
    let mut chunks = text.iterate();

    let engine = parser.engine();
    let run = tokio::spawn({
        let fragments = stream::iter(chunked(r#"{"text":"Hello\nWorld"}"#, 12));
        async move { engine.run(fragments).await }
    });

    let mut collected = String::new();
    while let Some(item) = futures::StreamExt::next(&mut chunks).await {
        match item.unwrap() {
            Emission::StringChunk(s) => collected.push_str(&s),
            Emission::Value(_) | Emission::Snapshot(_) => unreachable!("string path"),
        }
    }
    run.await.unwrap();

    assert_eq!(collected, "Hello\nWorld");
}

#[tokio::test]
async fn trailing_comma_in_array_is_tolerated() {
    let parser = Parser::new(ParserOptions::default());
    let items = parser
        .subscribe(&Path::parse("items").unwrap(), ValueKind::Array)
        .unwrap();

    run_chunked(&parser, r#"{"items":["first","second","last",]}"#, 7).await;

    let value = items.await_final().await.unwrap();
    assert_eq!(
        value.as_array().unwrap(),
        &vec![
            pathjson::JsonValue::String("first".into()),
            pathjson::JsonValue::String("second".into()),
            pathjson::JsonValue::String("last".into()),
        ]
    );
}

#[tokio::test]
async fn trailing_prose_after_the_root_value_is_ignored() {
    let parser = Parser::new(ParserOptions::default());
    let name = parser
        .subscribe(&Path::parse("name").unwrap(), ValueKind::String)
        .unwrap();

    run_chunked(
        &parser,
        "{\"name\":\"Valid\"} \n\n Here is some extra text I generated!",
        9,
    )
    .await;

    assert_eq!(
        name.await_final().await.unwrap(),
        pathjson::JsonValue::String("Valid".into())
    );
}

#[tokio::test]
async fn top_level_array_with_trailing_prose() {
    let parser = Parser::new(ParserOptions::default());
    let root = parser.subscribe(&Path::root(), ValueKind::Array).unwrap();

    run_chunked(
        &parser,
        "[\"apple\",\"banana\",\"cherry\"]\n\nThese are fruits.",
        6,
    )
    .await;

    assert_eq!(
        root.await_final().await.unwrap().as_array().unwrap(),
        &vec![
            pathjson::JsonValue::String("apple".into()),
            pathjson::JsonValue::String("banana".into()),
            pathjson::JsonValue::String("cherry".into()),
        ]
    );
}

#[tokio::test]
async fn long_string_streams_in_more_than_one_chunk() {
    let parser = Parser::new(ParserOptions::default());
    let value = parser
        .subscribe(&Path::root(), ValueKind::String)
        .unwrap();
    let mut chunks = value.iterate();

    let text = "This is a very long string that should be streamed in multiple chunks";
    let literal = format!("\"{text}\"");
    let engine = parser.engine();
    let run = tokio::spawn({
        let fragments = stream::iter(chunked(&literal, 15));
        async move { engine.run(fragments).await }
    });

    let mut seen = 0usize;
    let mut collected = String::new();
    while let Some(item) = futures::StreamExt::next(&mut chunks).await {
        match item.unwrap() {
            Emission::StringChunk(s) => {
                seen += 1;
                collected.push_str(&s);
            }
            Emission::Value(_) | Emission::Snapshot(_) => unreachable!("string path"),
        }
    }
    run.await.unwrap();

    assert!(seen >= 2, "expected at least 2 chunks, saw {seen}");
    assert_eq!(collected, text);
    assert_eq!(
        value.await_final().await.unwrap(),
        pathjson::JsonValue::String(text.into())
    );
}

#[tokio::test]
async fn truncated_input_fails_incomplete_subscriptions() {
    let parser = Parser::new(ParserOptions::default());
    let age = parser
        .subscribe(&Path::parse("age").unwrap(), ValueKind::Number)
        .unwrap();

    run_chunked(&parser, r#"{"name":"Alice","age":"#, 6).await;

    let err = age.await_final().await.unwrap_err();
    assert!(matches!(err, Error::Incomplete { .. }));
}

#[tokio::test]
async fn early_subscriber_kind_mismatch_fails_only_that_path() {
    let parser = Parser::new(ParserOptions::default());
    // Declared before a single character of the document has arrived, and
    // wrong: `age` is actually a number in the document below.
    let age = parser
        .subscribe(&Path::parse("age").unwrap(), ValueKind::String)
        .unwrap();
    let name = parser
        .subscribe(&Path::parse("name").unwrap(), ValueKind::String)
        .unwrap();

    run_chunked(&parser, r#"{"name":"Alice","age":30,"active":true}"#, 6).await;

    assert!(matches!(
        age.await_final().await.unwrap_err(),
        Error::TypeMismatch { .. }
    ));
    // The rest of the document still parses normally.
    assert_eq!(
        name.await_final().await.unwrap(),
        pathjson::JsonValue::String("Alice".into())
    );
}

#[tokio::test]
async fn early_root_kind_mismatch_fails_only_the_root_and_keeps_parsing_children() {
    let parser = Parser::new(ParserOptions::default());
    // The document is an array, not an object.
    let root = parser.subscribe(&Path::root(), ValueKind::Object).unwrap();
    let first = parser
        .subscribe(&Path::parse("[0]").unwrap(), ValueKind::String)
        .unwrap();

    run_chunked(&parser, r#"["apple","banana"]"#, 4).await;

    assert!(matches!(
        root.await_final().await.unwrap_err(),
        Error::TypeMismatch { .. }
    ));
    assert_eq!(
        first.await_final().await.unwrap(),
        pathjson::JsonValue::String("apple".into())
    );
}

#[tokio::test]
async fn property_discovery_fires_before_child_completion() {
    let parser = Parser::new(ParserOptions::default());
    let root = parser.subscribe(&Path::root(), ValueKind::Object).unwrap();
    let mut discovered = root.on_property();

    let engine = parser.engine();
    let run = tokio::spawn({
        let fragments = stream::iter(chunked(r#"{"a":1,"b":2}"#, 3));
        async move { engine.run(fragments).await }
    });

    let (first_child, first_key) = futures::StreamExt::next(&mut discovered)
        .await
        .expect("object yields at least one property");
    assert_eq!(&*first_key, "a");
    // The announcement strictly precedes the child completing.
    assert!(first_child.await_final().await.unwrap() == pathjson::JsonValue::Number(1.0));

    run.await.unwrap();
}

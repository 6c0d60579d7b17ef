//! Demonstrates reacting to a moderation field as soon as it is available,
//! while a `code` string from the same response streams in alongside it.
//!
//! The simulated response carries a `moderation.decision` field before the
//! (potentially large) `code` field, so a caller can bail out on `"block"`
//! without waiting for the rest of the document.
//!
//! Run with
//!
//! ```bash
//! cargo run -p pathjson --example llm_tool_call
//! ```

use futures::stream;
use pathjson::{Emission, Parser, ParserOptions, Path, ValueKind};

#[tokio::main]
async fn main() {
    // A toy assistant response, streamed in small, irregular chunks the way
    // a chat-completions API delivers partial tokens.
    let simulated_stream: [&str; 10] = [
        r#"{"moderation":{"decision":"al"#,
        r#"lo"#,
        r#"w","reason":null},"#,
        r#""filename":"example.rs","#,
        r#""language":"rust","#,
        r#""code":"use pathjson::Parser;\n"#,
        r#"fn main() {\n"#,
        r#"    let _parser = Parser::new(Default::default());\n"#,
        r#"    println!(\"Hello from pathjson!\");\n}\n"#,
        r#""}"#,
    ];

    let parser = Parser::new(ParserOptions::default());
    let decision = parser
        .subscribe(&Path::parse("moderation.decision").unwrap(), ValueKind::String)
        .unwrap();
    let code = parser
        .subscribe(&Path::parse("code").unwrap(), ValueKind::String)
        .unwrap();

    let engine = parser.engine();
    let fragments = stream::iter(
        simulated_stream
            .into_iter()
            .map(|s| Ok::<_, std::io::Error>(s.to_string())),
    );
    let run = tokio::spawn(engine.run(fragments));

    tokio::spawn(async move {
        let mut code_chunks = code.iterate();
        while let Some(emission) = futures::StreamExt::next(&mut code_chunks).await {
            if let Ok(Emission::StringChunk(chunk)) = emission {
                print!("{chunk}");
            }
        }
        println!();
    });

    match decision.await_final().await {
        Ok(value) if value.as_str() == Some("block") => {
            eprintln!("moderation blocked this response, aborting early");
            return;
        }
        Ok(value) => println!("moderation decision: {value}"),
        Err(err) => eprintln!("moderation subscription failed: {err}"),
    }

    run.await.expect("engine task panicked");
}

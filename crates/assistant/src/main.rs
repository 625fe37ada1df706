use clap::Parser;
use futures::StreamExt;
use juridoc_assistant::pipeline::EventStream;
use juridoc_assistant::settings::{build_assistant, Settings};
use juridoc_assistant::{Answer, AnswerEvent, Assistant};
use juridoc_core::response::format_response;
use juridoc_core::ArticleCitation;
use std::io::Write;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::parse();
    init_tracing(settings.log_json)?;

    let assistant = build_assistant(&settings).await?;

    match settings.question.as_deref() {
        Some(question) => ask(&assistant, &settings, question).await?,
        None => {
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let question = line.trim();
                if question.is_empty() {
                    continue;
                }
                ask(&assistant, &settings, question).await?;
            }
        }
    }
    Ok(())
}

fn init_tracing(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::from_default_env()
        .add_directive("juridoc_assistant=info".parse()?)
        .add_directive("juridoc_core=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn ask(
    assistant: &Assistant,
    settings: &Settings,
    question: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if settings.stream {
        let events = assistant.answer_stream(question).await;
        if settings.json {
            print_events_json(events).await
        } else {
            print_events(events).await
        }
    } else {
        let answer = assistant.answer_batch(question).await;
        if settings.json {
            println!("{}", serde_json::to_string(&answer)?);
        } else {
            print_answer(&answer);
        }
        Ok(())
    }
}

fn print_citations(articles: &[ArticleCitation]) {
    if articles.is_empty() {
        return;
    }
    println!("Sources:");
    for article in articles {
        let code = article.code.as_deref().unwrap_or("?");
        match &article.article_number {
            Some(number) => println!("  - {code}, article {number}"),
            None => println!("  - {code}"),
        }
    }
    println!();
}

fn print_answer(answer: &Answer) {
    print_citations(&answer.articles);
    println!("{}", answer.response);
}

async fn print_events_json(mut events: EventStream) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    while let Some(event) = events.next().await {
        writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
        stdout.flush()?;
    }
    Ok(())
}

async fn print_events(mut events: EventStream) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = std::io::stdout();
    let mut printed = String::new();
    while let Some(event) = events.next().await {
        match event {
            AnswerEvent::Articles { articles } => print_citations(&articles),
            AnswerEvent::Token { token } => {
                write!(stdout, "{token}")?;
                stdout.flush()?;
                printed.push_str(&token);
            }
            AnswerEvent::Complete { response } => {
                // Tokens were shown raw; print whatever the final answer adds
                let shown = format_response(&printed);
                match response.strip_prefix(shown.as_str()) {
                    Some(rest) => writeln!(stdout, "{rest}")?,
                    None => writeln!(stdout, "\n\n{response}")?,
                }
            }
        }
    }
    Ok(())
}

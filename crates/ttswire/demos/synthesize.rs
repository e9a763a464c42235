//! Synthesize one sentence and write it to a file, printing informational
//! frames as they arrive.
//!
//! Run with:
//!   VOLCENGINE_APP_ID=... VOLCENGINE_ACCESS_TOKEN=... \
//!     cargo run -p ttswire --example synthesize -- "Hello there" BV001_streaming out.wav

use ttswire::client::{AuthConfig, ClientConfig, SessionState, SynthesisRequest, TtsClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let text = args.next().unwrap_or_else(|| "Hello from ttswire.".to_string());
    let voice = args.next().unwrap_or_else(|| "BV001_streaming".to_string());
    let output = args.next().unwrap_or_else(|| "ttswire-demo.wav".to_string());

    let auth = AuthConfig::new(
        std::env::var("VOLCENGINE_APP_ID")?,
        std::env::var("VOLCENGINE_ACCESS_TOKEN")?,
    );
    let mut client = TtsClient::new(ClientConfig::new(auth));
    client.connect().await?;
    let mut client = client.on_message(|message| eprintln!("server: {message}"));

    let outcome = client
        .send_request_detailed(&SynthesisRequest::new(text, voice))
        .await?;
    assert_eq!(client.state(), SessionState::Closed);

    std::fs::write(&output, &outcome.audio)?;
    eprintln!(
        "wrote {} bytes in {} chunks to {output} (first chunk after {:?}, total {:?})",
        outcome.audio.len(),
        outcome.chunks,
        outcome.first_chunk,
        outcome.elapsed
    );
    Ok(())
}

use anvil::config::Config;
use anvil::http::headers::Headers;
use anvil::http::request::Request;
use anvil::http::response::{StatusCode, WriteError};
use anvil::server::{ConnectionWriter, Reply, Server};
use sha2::{Digest, Sha256};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let server = Server::serve(cfg.server.port, route).await?;
    info!("Server started on port {}", server.local_addr().port());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    server.close();

    Ok(())
}

async fn route(mut writer: ConnectionWriter, request: Request) {
    let target = request
        .request_line()
        .map(|line| line.request_target.clone())
        .unwrap_or_default();

    let result = match target.as_str() {
        "/problem/client" => {
            page(&mut writer, StatusCode::BadRequest, "Your request honestly kinda sucked.").await
        }
        "/problem/server" => {
            page(
                &mut writer,
                StatusCode::InternalServerError,
                "Okay, you know what? This one is on me.",
            )
            .await
        }
        "/stream" => stream(&mut writer).await,
        _ => page(&mut writer, StatusCode::Ok, "Your request was an absolute banger.").await,
    };

    if let Err(e) = result {
        error!("Handler write error: {}", e);
    }
}

async fn page(
    writer: &mut ConnectionWriter,
    status: StatusCode,
    message: &str,
) -> Result<(), WriteError> {
    Reply::new(status)
        .header("Content-Type", "text/html")
        .body(html_page(status, message))
        .send(writer)
        .await
}

fn html_page(status: StatusCode, message: &str) -> String {
    format!(
        "<html>\n  <head>\n    <title>{code} {reason}</title>\n  </head>\n  <body>\n    \
         <h1>{reason}</h1>\n    <p>{message}</p>\n  </body>\n</html>\n",
        code = status.as_u16(),
        reason = status.reason_phrase(),
    )
}

/// Streams a generated payload with chunked transfer coding, then reports
/// its SHA-256 and length in trailers.
async fn stream(writer: &mut ConnectionWriter) -> Result<(), WriteError> {
    let mut headers = Headers::new();
    headers.replace("Content-Type", "application/octet-stream");
    headers.replace("Connection", "close");
    headers.replace("Transfer-Encoding", "chunked");
    headers.replace("Trailer", "X-Content-Sha256, X-Content-Length");

    writer.write_status_line(StatusCode::Ok).await?;
    writer.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut total = 0;
    for chunk in payload_chunks() {
        hasher.update(&chunk);
        total += chunk.len();
        writer.write_chunked_body(&chunk).await?;
    }
    writer.write_chunked_body_done().await?;

    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|byte| format!("{byte:02x}")).collect();
    let mut trailers = Headers::new();
    trailers.replace("X-Content-Sha256", &hex);
    trailers.replace("X-Content-Length", &total.to_string());
    writer.write_trailers(&trailers).await?;
    Ok(())
}

fn payload_chunks() -> impl Iterator<Item = Vec<u8>> {
    (0..16u8).map(|i| vec![b'a' + (i % 26); 64])
}

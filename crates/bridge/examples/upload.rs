use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::Request;
use http_body_util::Full;
use micro_body::{Body, Kind};
use micro_body_bridge::{bridge_request, BridgeConfig, HttpHostBody};
use serde::Deserialize;
use std::thread;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Deserialize, Debug)]
pub struct User {
    name: String,
    zip: String,
}

fn handle(body: &Body<HttpHostBody>) -> String {
    match body.kind() {
        Kind::None => "empty body".to_string(),
        Kind::Text => match body.text() {
            Ok(text) => format!("receive text: {text}"),
            Err(e) => format!("bad text: {e}"),
        },
        Kind::Json => match body.json::<User>() {
            Ok(user) => format!("receive user: {} / {}", user.name, user.zip),
            Err(e) => format!("bad json: {e}"),
        },
        Kind::Fields => {
            let user = body.fields::<User>();
            match body.files() {
                Ok(files) => {
                    let names: Vec<_> = files.iter().map(|f| format!("{} ({} bytes)", f.name(), f.size())).collect();
                    format!("receive fields: {user:?}, files: {names:?}")
                }
                Err(e) => format!("receive fields: {user:?}, bad files: {e}"),
            }
        }
        Kind::Binary => match body.binary() {
            Ok(payload) => format!("receive {} bytes of {}, head: {:?}", payload.len(), payload.mime(), payload.head(4)),
            Err(e) => format!("bad binary: {e}"),
        },
    }
}

fn request(content_type: &str, body: &'static [u8]) -> Request<Full<Bytes>> {
    Request::builder()
        .uri("/")
        .header(CONTENT_TYPE, content_type)
        .body(Full::new(Bytes::from_static(body)))
        .expect("request should be valid")
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = BridgeConfig::builder().default_binary_type(mime::APPLICATION_OCTET_STREAM).build();

    let requests = vec![
        request(mime::TEXT_PLAIN.as_ref(), b"hello world"),
        request(mime::APPLICATION_JSON.as_ref(), br#"{"name":"hello","zip":"world"}"#),
        request(mime::APPLICATION_WWW_FORM_URLENCODED.as_ref(), b"name=hello&zip=world"),
        request(
            "multipart/form-data; boundary=X",
            b"--X\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\nhello\r\n\
              --X\r\nContent-Disposition: form-data; name=\"zip\"\r\n\r\nworld\r\n\
              --X\r\nContent-Disposition: form-data; name=\"greeting\"; filename=\"hello.txt\"\r\n\
              Content-Type: text/plain\r\n\r\nHello, world!\r\n--X--\r\n",
        ),
        request(mime::APPLICATION_OCTET_STREAM.as_ref(), &[0x48, 0x65, 0x6C, 0x6C, 0x6F]),
        request("image/png", &[0x89, 0x50, 0x4E, 0x47]),
    ];

    for request in requests {
        let request = match bridge_request(request, &config).await {
            Ok(request) => request,
            Err(e) => {
                error!(cause = %e, "bridge request error");
                continue;
            }
        };

        // handlers may share one body across worker threads, the host is still read only once
        let body = request.body();
        thread::scope(|s| {
            for worker in 0..2 {
                s.spawn(move || info!(worker, response = %handle(body), "handled request"));
            }
        });
    }
}

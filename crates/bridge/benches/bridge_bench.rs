use bytes::Bytes;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use micro_body_bridge::multipart::MultipartDecoder;
use micro_body_bridge::{bridge_parts, BridgeConfig};
use std::collections::HashMap;
use std::hint::black_box;

const BOUNDARY: &str = "----bench";

fn multipart_body(files: usize, file_size: usize) -> Bytes {
    let mut body = Vec::new();
    body.extend_from_slice(b"------bench\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nbench\r\n");
    for i in 0..files {
        body.extend_from_slice(
            format!(
                "------bench\r\nContent-Disposition: form-data; name=\"file{i}\"; filename=\"file{i}.bin\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend(std::iter::repeat_n(b'x', file_size));
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(b"------bench--\r\n");
    Bytes::from(body)
}

fn headers(content_type: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers
}

fn benchmark_multipart_decoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("multipart_decoder");
    let decoder = MultipartDecoder::new(BOUNDARY);

    for (files, file_size) in [(1, 1024), (8, 1024), (2, 64 * 1024)] {
        let body = multipart_body(files, file_size);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(format!("{files}x{file_size}")), &body, |b, body| {
            b.iter(|| black_box(decoder.decode(body).expect("input should be a valid multipart body")));
        });
    }

    group.finish();
}

fn benchmark_bridge(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("bridge");
    let config = BridgeConfig::default();

    let multipart = headers("multipart/form-data; boundary=----bench");
    let body = multipart_body(4, 4096);
    group.bench_function("multipart_files", |b| {
        b.iter_batched(
            || body.clone(),
            |body| {
                let body = bridge_parts(&multipart, body, &config).expect("input should be bridged");
                black_box(body.files().expect("files should be copied"));
            },
            BatchSize::SmallInput,
        );
    });

    let json = headers("application/json");
    let body = Bytes::from_static(br#"{"name":"hello","zip":"world","tags":["a","b","c"]}"#);
    group.bench_function("json_decode_repeated", |b| {
        let body = bridge_parts(&json, body.clone(), &config).expect("input should be bridged");
        b.iter(|| black_box(body.json::<HashMap<String, serde_json::Value>>().expect("json should decode")));
    });

    group.finish();
}

criterion_group!(bridge, benchmark_multipart_decoder, benchmark_bridge);
criterion_main!(bridge);

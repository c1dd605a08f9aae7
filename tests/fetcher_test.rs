//! 画像取得の統合テスト
//!
//! ローカルに最小のHTTPサーバーを立て、成功・各種失敗を確認する。

use catalog_export::fetcher::{FetchSettings, HttpImageFetcher, ImageFetcher, ImagePayload};
use catalog_export_common::ImageFormatTag;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([120, 160, 80, 255]));
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img).write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

fn response(status: &str, content_type: &str, body: &[u8], content_length: Option<usize>) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {}\r\nContent-Type: {}\r\nConnection: close\r\n", status, content_type);
    if let Some(length) = content_length {
        head.push_str(&format!("Content-Length: {}\r\n", length));
    }
    head.push_str("\r\n");
    let mut bytes = head.into_bytes();
    bytes.extend_from_slice(body);
    bytes
}

async fn route(path: &str) -> Vec<u8> {
    match path {
        "/ok.png" => {
            let body = png_fixture(300, 150);
            response("200 OK", "image/png", &body, Some(body.len()))
        }
        "/photo.jpg" => {
            let body = png_fixture(20, 20);
            response("200 OK", "image/jpeg", &body, Some(body.len()))
        }
        "/page" => response("200 OK", "text/html", b"<html></html>", Some(13)),
        "/corrupt.png" => response("200 OK", "image/png", b"garbage", Some(7)),
        // 宣言サイズが上限超過
        "/declared-big.png" => response("200 OK", "image/png", b"", Some(10 * 1024 * 1024)),
        // Content-Length なしで上限超過
        "/streamed-big.png" => response("200 OK", "image/png", &vec![0u8; 200 * 1024], None),
        "/slow.png" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            let body = png_fixture(10, 10);
            response("200 OK", "image/png", &body, Some(body.len()))
        }
        _ => response("404 Not Found", "text/plain", b"not found", Some(9)),
    }
}

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind失敗");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let bytes = route(&path).await;
                let _ = socket.write_all(&bytes).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

fn fetcher() -> HttpImageFetcher {
    HttpImageFetcher::new(FetchSettings {
        timeout: Duration::from_millis(800),
        max_bytes: 64 * 1024,
        thumbnail_edge_px: 240,
    })
    .expect("クライアント生成失敗")
}

#[tokio::test]
async fn test_fetch_png_is_downscaled() {
    let addr = spawn_server().await;
    let payload = fetcher().fetch(&format!("http://{}/ok.png", addr)).await;

    let image = payload.as_embedded().expect("画像が取得できていない");
    assert_eq!(image.format, ImageFormatTag::Png);
    assert_eq!((image.width, image.height), (240, 120));
    assert!(image.data_url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_fetch_uses_declared_content_type_for_tag() {
    let addr = spawn_server().await;
    let payload = fetcher().fetch(&format!("http://{}/photo.jpg", addr)).await;

    let image = payload.as_embedded().expect("画像が取得できていない");
    assert_eq!(image.format, ImageFormatTag::Jpeg);
    assert!(image.data_url.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn test_fetch_failures_become_absent() {
    let addr = spawn_server().await;
    let fetcher = fetcher();

    for path in ["/missing.png", "/page", "/corrupt.png", "/declared-big.png", "/streamed-big.png"] {
        let payload = fetcher.fetch(&format!("http://{}{}", addr, path)).await;
        assert_eq!(payload, ImagePayload::Absent, "{} は Absent になるべき", path);
    }
}

#[tokio::test]
async fn test_fetch_invalid_urls() {
    let fetcher = fetcher();
    for url in ["", "   ", "not a url", "ftp://cdn.example/a.png", "file:///etc/passwd"] {
        assert_eq!(fetcher.fetch(url).await, ImagePayload::Absent, "{:?}", url);
    }
}

#[tokio::test]
async fn test_fetch_timeout_is_bounded() {
    let addr = spawn_server().await;
    let started = Instant::now();
    let payload = fetcher().fetch(&format!("http://{}/slow.png", addr)).await;

    assert_eq!(payload, ImagePayload::Absent);
    assert!(started.elapsed() < Duration::from_secs(3), "タイムアウトで打ち切られていない");
}

#[tokio::test]
async fn test_unreachable_host_is_absent() {
    // 解放済みのポート
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let payload = fetcher().fetch(&format!("http://{}/ok.png", addr)).await;
    assert_eq!(payload, ImagePayload::Absent);
}

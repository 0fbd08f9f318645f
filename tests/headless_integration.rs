#![cfg(feature = "headless")]

//! Headless shell against a local HTTP server.

use pageshell::rendering::render_document;
use pageshell::surface::headless::HeadlessSurfaceFactory;
use pageshell::{
    DetailView, PaneId, RenderingSurface, ShellConfig, ShellHandle, SurfaceFactory, Viewport,
};
use std::sync::Once;
use std::time::Duration;
use tiny_http::{Response, Server};

static INIT: Once = Once::new();

const PAGE_A: &str = r#"<!DOCTYPE html>
<html>
<head><title>Page A</title></head>
<body>
<h1>Hello from A</h1>
<p>This is the first test page.</p>
</body>
</html>"#;

const PAGE_B: &str = r#"<!DOCTYPE html>
<html>
<head><title>Page B</title></head>
<body>
<h1>Greetings from B</h1>
<p>This is the second test page, with a longer paragraph that wraps.</p>
</body>
</html>"#;

fn html_response(html: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(html).with_header(
        "Content-Type: text/html; charset=utf-8"
            .parse::<tiny_http::Header>()
            .unwrap(),
    )
}

fn start_test_server() -> String {
    INIT.call_once(|| {
        std::thread::spawn(|| {
            let server = Server::http("127.0.0.1:18090").unwrap();
            for request in server.incoming_requests() {
                if request.url() == "/slow" {
                    std::thread::spawn(move || {
                        std::thread::sleep(Duration::from_millis(300));
                        let _ = request.respond(html_response(PAGE_A));
                    });
                    continue;
                }
                let response = match request.url() {
                    "/a" => html_response(PAGE_A),
                    "/b" => html_response(PAGE_B),
                    _ => Response::from_string("Not Found").with_status_code(404),
                };
                let _ = request.respond(response);
            }
        });
        // Give the server time to start
        std::thread::sleep(Duration::from_millis(100));
    });

    "http://127.0.0.1:18090".to_string()
}

fn viewport() -> Viewport {
    Viewport { width: 256, height: 128 }
}

fn config(base: &str) -> ShellConfig {
    ShellConfig {
        viewport: viewport(),
        timeout_ms: 5000,
        initial_pages: vec![format!("{}/a", base), format!("{}/b", base)],
        ..Default::default()
    }
}

#[tokio::test]
async fn snapshot_reflects_selected_page() {
    let base = start_test_server();
    let shell = ShellHandle::headless(config(&base)).await.expect("shell");

    assert!(shell.snapshot().await.unwrap().is_none(), "nothing selected yet");

    shell.select_index(0).await.unwrap().expect("page a");
    let a = shell.snapshot().await.unwrap().expect("bitmap a");
    assert_eq!(a.url.as_ref().map(|u| u.path()), Some("/a"));
    assert_eq!(a.digest(), render_document(PAGE_A, viewport()).digest());

    shell.select_index(1).await.unwrap().expect("page b");
    let b = shell.snapshot().await.unwrap().expect("bitmap b");
    assert_eq!(b.url.as_ref().map(|u| u.path()), Some("/b"));
    assert_eq!(b.digest(), render_document(PAGE_B, viewport()).digest());
    assert_ne!(a.digest(), b.digest());

    // text and background both present
    assert!(b.pixels.chunks(4).any(|p| p == [0, 0, 0, 255]));
    assert!(b.pixels.chunks(4).any(|p| p == [255, 255, 255, 255]));

    let png = b.to_png().unwrap();
    assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");

    match shell.detail().await.unwrap() {
        DetailView::Page { overlay, .. } => {
            let overlay = overlay.expect("overlay");
            assert_eq!((overlay.width, overlay.height), (128, 64));
        }
        other => panic!("unexpected detail {:?}", other),
    }

    shell.close().await.unwrap();
}

#[tokio::test]
async fn missing_page_renders_blank() {
    let base = start_test_server();
    let shell = ShellHandle::headless(config(&base)).await.expect("shell");
    let id = shell
        .open(&format!("{}/missing", base))
        .await
        .unwrap()
        .expect("valid URL");
    shell.select(id).await.unwrap();

    let bitmap = shell.snapshot().await.unwrap().expect("bitmap");
    assert!(bitmap.pixels.chunks(4).all(|p| p == [255, 255, 255, 255]));
    shell.close().await.unwrap();
}

#[tokio::test]
async fn redraw_timer_does_not_reload() {
    let base = start_test_server();
    let cfg = ShellConfig {
        redraw_interval_ms: 5,
        ..config(&base)
    };
    let shell = ShellHandle::headless(cfg).await.expect("shell");
    shell.select_index(0).await.unwrap();
    let first = shell.snapshot().await.unwrap().expect("bitmap");

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(shell.passes().await.unwrap() > 3);
    let again = shell.snapshot().await.unwrap().expect("bitmap");
    assert_eq!(first.digest(), again.digest());
    shell.close().await.unwrap();
}

#[tokio::test]
async fn capture_waits_for_load_issued_mid_fetch() {
    let base = start_test_server();
    let factory = HeadlessSurfaceFactory::new(&config(&base)).expect("factory");
    let surface = factory.make_surface(PaneId::fresh());
    let slow = url::Url::parse(&format!("{}/slow", base)).unwrap();
    let b = url::Url::parse(&format!("{}/b", base)).unwrap();

    surface.load(&slow);
    let capture = surface.capture_visible_content();
    let switch = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        surface.load(&b);
    };
    let (bitmap, ()) = tokio::join!(capture, switch);

    let bitmap = bitmap.unwrap();
    assert_eq!(bitmap.url, Some(b));
    assert_eq!(bitmap.digest(), render_document(PAGE_B, viewport()).digest());
    assert!(surface.is_ready());
}

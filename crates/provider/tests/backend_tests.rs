use anyhow::Result;
use provider::{
    Content, Error, Format, FormatError, FormatResult, HandlerKind, HandlerSpec, Mode, Namespace,
    Options, Provider, ProviderConfig, Source,
};
use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

fn provider() -> Result<Provider> {
    Ok(Provider::new(&ProviderConfig::default())?)
}

/// Serve `routes` over HTTP on a local port, one request per connection.
fn serve(routes: Vec<(&'static str, &'static str)>) -> Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();

    let _ = thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            loop {
                let mut header = String::new();
                match reader.read_line(&mut header) {
                    Ok(0) | Err(_) => break,
                    Ok(_) if header == "\r\n" => break,
                    Ok(_) => {}
                }
            }

            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default();
            let path = parts.next().unwrap_or_default();
            let response = match routes.iter().find(|(route, _)| *route == path) {
                Some((_, body)) => {
                    let payload = if method == "HEAD" { "" } else { body };
                    format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                        body.len()
                    )
                }
                None => "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                    .to_string(),
            };
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.flush();
        }
    });
    Ok(port)
}

#[test]
fn test_http_reads() -> Result<()> {
    let port = serve(vec![
        ("/data.json", r#"{"levels": [1, 2, 3]}"#),
        ("/page", "<html>hello</html>"),
    ])?;
    let provider = provider()?;

    let doc = provider.read(
        &format!("http://127.0.0.1:{port}/data.json"),
        None,
        &Options::new(),
    )?;
    assert_eq!(doc, Content::Json(json!({"levels": [1, 2, 3]})));

    let page = provider.read(&format!("http:127.0.0.1:{port}/page"), None, &Options::new())?;
    assert_eq!(page.as_bytes(), Some(&b"<html>hello</html>"[..]));

    let raw = provider.read(
        &format!("http://127.0.0.1:{port}/data.json"),
        Some("url"),
        &Options::new(),
    )?;
    assert!(matches!(raw, Content::Bytes(_)));
    Ok(())
}

#[test]
fn test_http_missing_and_exists() -> Result<()> {
    let port = serve(vec![("/here.txt", "present")])?;
    let provider = provider()?;

    let present = provider.acquire(&format!("http://127.0.0.1:{port}/here.txt"), None)?;
    assert!(present.exists()?);

    let absent = provider.acquire(&format!("http://127.0.0.1:{port}/gone.txt"), None)?;
    assert!(!absent.exists()?);
    assert!(matches!(
        absent.read(&Options::new()),
        Err(Error::NotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_python_objects_and_reload() -> Result<()> {
    let provider = provider()?;
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = builds.clone();
    provider.loader().register_module("weir.settings", move || {
        let generation = counter.fetch_add(1, Ordering::SeqCst) + 1;
        Namespace::new()
            .with_value("generation", generation)
            .with_value("name", "weir".to_string())
    });

    let name = provider.read("python://weir.settings.name", None, &Options::new())?;
    let name = name.as_object().and_then(|o| o.downcast_ref::<String>()).cloned();
    assert_eq!(name.as_deref(), Some("weir"));

    let first = provider.read("python:weir.settings.generation", Some("pyobj"), &Options::new())?;
    let first = first.as_object().and_then(|o| o.downcast_ref::<usize>()).copied();
    assert_eq!(first, Some(1));

    let reloaded = provider.read(
        "python:weir.settings.generation",
        None,
        &Options::new().with("reload", true),
    )?;
    let reloaded = reloaded.as_object().and_then(|o| o.downcast_ref::<usize>()).copied();
    assert_eq!(reloaded, Some(2));
    assert_eq!(builds.load(Ordering::SeqCst), 2);

    let err = provider
        .read("python:weir.settings.missing", None, &Options::new())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { ref handler, .. } if handler == "python"));

    let err = provider
        .write(&Content::Json(json!(1)), "python:weir.settings.name", None, true, &Options::new())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation { .. }));
    Ok(())
}

/// One JSON string per line
#[derive(Debug)]
struct LinesFormat;

impl Format for LinesFormat {
    fn mode(&self) -> Mode {
        Mode::Text
    }

    fn decode(&self, mut source: Source<'_>, _options: &Options) -> FormatResult<Content> {
        let text = source.read_text()?;
        Ok(Content::Json(Value::Array(
            text.lines().map(|l| Value::String(l.to_string())).collect(),
        )))
    }

    fn encode(
        &self,
        content: &Content,
        sink: &mut (dyn Write + Send),
        _options: &Options,
    ) -> FormatResult<()> {
        let Some(Value::Array(items)) = content.as_json() else {
            return Err(FormatError::Encode("expected a list".into()));
        };
        for item in items {
            let line = item
                .as_str()
                .ok_or_else(|| FormatError::Encode(format!("not a string: {item}")))?;
            writeln!(sink, "{line}")?;
        }
        Ok(())
    }
}

#[test]
fn test_custom_format_registration() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut provider = provider()?;
    provider.register_handler(
        HandlerSpec::new("lines", HandlerKind::Custom(Arc::new(LinesFormat)))
            .aliases(&["lst"])
            .extensions(&["lines", "lst"]),
    )?;

    let target = dir.path().join("names.lst").display().to_string();
    let names = Content::Json(json!(["ann", "bob"]));
    provider.write(&names, &target, None, false, &Options::new())?;
    assert_eq!(std::fs::read_to_string(&target)?, "ann\nbob\n");
    assert_eq!(provider.read(&target, Some("lines"), &Options::new())?, names);

    let err = provider
        .register_handler(
            HandlerSpec::new("lines2", HandlerKind::Custom(Arc::new(LinesFormat))).aliases(&["txt"]),
        )
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateAlias { ref existing, .. } if existing == "file.text"));

    let err = provider
        .register_handler(
            HandlerSpec::new("lines3", HandlerKind::Custom(Arc::new(LinesFormat)))
                .extensions(&["csv"]),
        )
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateMapping { .. }));

    let read_only = HandlerSpec::new("lines.ro", HandlerKind::Custom(Arc::new(LinesFormat)))
        .extensions(&["rolines"])
        .read_only(true);
    provider.register_handler(read_only)?;
    let err = provider
        .write(
            &names,
            &dir.path().join("x.rolines").display().to_string(),
            None,
            false,
            &Options::new(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation { .. }));
    Ok(())
}

#[test]
fn test_remove() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let provider = provider()?;
    let target = dir.path().join("gone.txt").display().to_string();
    provider.write(&Content::Text("x".into()), &target, None, false, &Options::new())?;

    let handler = provider.acquire(&target, None)?;
    assert!(handler.exists()?);
    handler.remove()?;
    assert!(!handler.exists()?);
    assert!(matches!(handler.remove(), Err(Error::Io { .. })));
    Ok(())
}

#[test]
fn test_directories_are_never_removed() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let provider = provider()?;
    let nested = dir.path().join("out.json").join("inner");
    std::fs::create_dir_all(&nested)?;
    std::fs::write(nested.join("keep.txt"), "keep")?;
    let target = dir.path().join("out.json").display().to_string();

    let err = provider
        .write(&Content::Json(json!(1)), &target, None, true, &Options::new())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedOperation { .. }));
    assert_eq!(std::fs::read_to_string(nested.join("keep.txt"))?, "keep");

    let handler = provider.acquire(&target, None)?;
    assert!(matches!(handler.remove(), Err(Error::UnsupportedOperation { .. })));
    assert!(nested.join("keep.txt").exists());
    Ok(())
}

/// Declares text but writes raw Latin-1
#[derive(Debug)]
struct Latin1Format;

impl Format for Latin1Format {
    fn mode(&self) -> Mode {
        Mode::Text
    }

    fn decode(&self, mut source: Source<'_>, _options: &Options) -> FormatResult<Content> {
        Ok(Content::Bytes(source.read_all()?))
    }

    fn encode(
        &self,
        _content: &Content,
        sink: &mut (dyn Write + Send),
        _options: &Options,
    ) -> FormatResult<()> {
        sink.write_all(b"caf\xe9")?;
        Ok(())
    }
}

#[test]
fn test_text_formats_must_write_utf8() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let mut provider = provider()?;
    provider.register_handler(
        HandlerSpec::new("latin1", HandlerKind::Custom(Arc::new(Latin1Format)))
            .extensions(&["latin1"]),
    )?;

    let target = dir.path().join("menu.latin1");
    let err = provider
        .write(
            &Content::Text("café".into()),
            &target.display().to_string(),
            None,
            false,
            &Options::new(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::Encode { ref handler, .. } if handler == "latin1"));
    assert!(!target.exists());
    Ok(())
}

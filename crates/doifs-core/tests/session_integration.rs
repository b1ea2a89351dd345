//! End-to-end session tests against a mock handle API and provider.

use std::io;

use doifs_core::config::{ClientConfig, Options};
use doifs_core::http::ByteRange;
use doifs_core::provider::Provider;
use doifs_core::session::DoiSession;
use doifs_core::vfs::{DoiBackend, RemoteRef, Vfs, VfsEntryKind};
use doifs_core::{DirItem, DoiError};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

fn client_config(server: &ServerGuard) -> ClientConfig {
    ClientConfig {
        resolver_url: format!("{}/api", server.url()),
        user_agent: "doifs-test".into(),
    }
}

async fn mock_handle(server: &mut ServerGuard, doi: &str, target: &str) -> Mock {
    let body = json!({
        "responseCode": 1,
        "handle": doi,
        "values": [
            {"index": 1, "type": "URL", "data": {"format": "string", "value": target}}
        ]
    });
    server
        .mock("GET", format!("/api/handles/{}", doi).as_str())
        .match_query(Matcher::UrlEncoded("index".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

/// An Invenio record at `/api/records/77` advertised through a linkset header.
async fn mock_invenio(server: &mut ServerGuard) -> Vec<Mock> {
    let base = server.url();
    let handle = mock_handle(server, "10.1234/data.77", &format!("{}/records/77", base)).await;
    let landing = server
        .mock("GET", "/records/77")
        .with_status(200)
        .with_header(
            "link",
            &format!(
                r#"<{}/api/records/77>; rel="linkset"; type="application/linkset+json""#,
                base
            ),
        )
        .with_body("<html></html>")
        .create_async()
        .await;
    let record = server
        .mock("GET", "/api/records/77")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"id": "77", "links": {"self": format!("{}/api/records/77", base)}}).to_string())
        .create_async()
        .await;
    vec![handle, landing, record]
}

fn invenio_files(base: &str) -> String {
    json!({
        "entries": [
            {
                "key": "table.csv",
                "checksum": "md5:abcdef0123456789",
                "size": 11,
                "updated": "2025-03-20T10:15:30+00:00",
                "mimetype": "text/csv",
                "links": {"content": format!("{}/api/records/77/files/table.csv/content", base)}
            },
            {
                "key": "notes.txt",
                "checksum": "md5:00",
                "size": 5,
                "updated": "garbage",
                "mimetype": "text/plain",
                "links": {"content": format!("{}/api/records/77/files/notes.txt/content", base)}
            }
        ]
    })
    .to_string()
}

#[tokio::test]
async fn test_list_files_fetches_once() {
    let mut server = Server::new_async().await;
    let _invenio = mock_invenio(&mut server).await;
    let base = server.url();
    let files = server
        .mock("GET", "/api/records/77/files")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(invenio_files(&base))
        .expect(1)
        .create_async()
        .await;

    let (session, is_file) =
        DoiSession::connect("data", "", Options::new("doi:10.1234/data.77"), &client_config(&server))
            .await
            .unwrap();
    assert!(!is_file);
    assert_eq!(session.provider(), Provider::Invenio);
    assert_eq!(session.to_string(), "DOI 10.1234/data.77");

    let first = session.list_files().await.unwrap();
    let second = session.list_files().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].checksum, "abcdef0123456789");
    assert!(first[0].has_modified_time());
    assert!(!first[1].has_modified_time());

    // list and stat are served from the same cached set
    assert_eq!(session.list("").await.unwrap().len(), 2);
    assert_eq!(session.stat("notes.txt").await.unwrap().size, 5);
    files.assert_async().await;
}

#[tokio::test]
async fn test_invenio_subdirectory_is_not_found() {
    let mut server = Server::new_async().await;
    let _invenio = mock_invenio(&mut server).await;
    let base = server.url();
    let _mock = server
        .mock("GET", "/api/records/77/files")
        .with_status(200)
        .with_body(invenio_files(&base))
        .create_async()
        .await;

    let (session, _) =
        DoiSession::connect("data", "", Options::new("10.1234/data.77"), &client_config(&server))
            .await
            .unwrap();
    let err = session.list("sub").await.unwrap_err();
    assert!(matches!(err, DoiError::NotFound(_)));
    let err = session.stat("missing.bin").await.unwrap_err();
    assert!(matches!(err, DoiError::NotFound(_)));
}

#[tokio::test]
async fn test_invenio_root_naming_a_file() {
    let mut server = Server::new_async().await;
    let _invenio = mock_invenio(&mut server).await;

    let (session, is_file) = DoiSession::connect(
        "data",
        "/table.csv",
        Options::new("10.1234/data.77"),
        &client_config(&server),
    )
    .await
    .unwrap();
    assert!(is_file);
    assert_eq!(session.root(), "");
}

#[tokio::test]
async fn test_zenodo_override_and_ranged_read() {
    let mut server = Server::new_async().await;
    let base = server.url();
    let _handle = mock_handle(&mut server, "10.5281/zenodo.15063252", &format!("{}/records/15063252", base)).await;
    let _mock = server
        .mock("GET", "/api/records/15063252")
        .with_status(200)
        .with_body(json!({"links": {"self": format!("{}/api/records/15063252", base)}}).to_string())
        .create_async()
        .await;
    let _mock = server
        .mock("GET", "/api/records/15063252/files")
        .with_status(200)
        .with_body(
            json!({"entries": [{
                "key": "hello.txt", "checksum": "md5:5d41402abc4b2a76b9719d911017c592",
                "size": 11, "updated": "2025-01-01T00:00:00Z", "mimetype": "text/plain",
                "links": {"content": format!("{}/api/records/15063252/files/hello.txt/content", base)}
            }]})
            .to_string(),
        )
        .create_async()
        .await;
    let content = server
        .mock("GET", "/api/records/15063252/files/hello.txt/content")
        .match_header("range", "bytes=6-10")
        .with_status(206)
        .with_body("world")
        .expect(1)
        .create_async()
        .await;

    let mut options = Options::new("  10.5281/zenodo.15063252\n");
    options.provider = Some(Provider::Zenodo);
    let (session, _) = DoiSession::connect("z", "", options, &client_config(&server))
        .await
        .unwrap();
    assert_eq!(session.provider(), Provider::Zenodo);
    assert_eq!(session.doi(), "10.5281/zenodo.15063252");

    let entry = session.stat("hello.txt").await.unwrap();
    assert_eq!(entry.hash("md5"), Some("5d41402abc4b2a76b9719d911017c592"));
    let data = session
        .read(&entry, Some(ByteRange::from_offset(6, Some(5))))
        .await
        .unwrap();
    assert_eq!(data, b"world");

    let empty = session
        .read(&entry, Some(ByteRange::from_offset(6, Some(0))))
        .await
        .unwrap();
    assert!(empty.is_empty());
    content.assert_async().await;
}

async fn mock_dataverse(server: &mut ServerGuard) -> Vec<Mock> {
    let base = server.url();
    let handle = mock_handle(
        server,
        "10.7910/DVN/ABC123",
        &format!("{}/dataset.xhtml?persistentId=doi:10.7910/DVN/ABC123", base),
    )
    .await;
    let body = json!({
        "status": "OK",
        "data": {"latestVersion": {
            "lastUpdateTime": "2024-05-01T12:00:00Z",
            "files": [
                {"directoryLabel": "", "dataFile": {"id": 10, "filename": "README.md", "contentType": "text/markdown", "filesize": 4, "md5": "aa"}},
                {"directoryLabel": "sub", "dataFile": {"id": 11, "filename": "a.csv", "contentType": "text/csv", "filesize": 3, "md5": "bb"}},
                {"directoryLabel": "sub", "dataFile": {"id": 12, "filename": "b.csv", "contentType": "text/csv", "filesize": 3, "md5": "cc"}}
            ]
        }}
    });
    let dataset = server
        .mock("GET", "/api/datasets/:persistentId/")
        .match_query(Matcher::UrlEncoded(
            "persistentId".into(),
            "doi:10.7910/DVN/ABC123".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await;
    vec![handle, dataset]
}

fn dataverse_options() -> Options {
    let mut options = Options::new("https://doi.org/10.7910/DVN/ABC123");
    options.provider = Some(Provider::Dataverse);
    options
}

#[tokio::test]
async fn test_dataverse_tree() {
    let mut server = Server::new_async().await;
    let _dataverse = mock_dataverse(&mut server).await;

    let (session, is_file) =
        DoiSession::connect("dv", "", dataverse_options(), &client_config(&server))
            .await
            .unwrap();
    assert!(!is_file);
    assert!(session.endpoint().path().contains(":persistentId"));

    let root = session.list("").await.unwrap();
    assert_eq!(root.len(), 2);
    assert_eq!(root[0].path(), "README.md");
    assert_eq!(root[1], DirItem::Directory { path: "sub".into() });

    let sub = session.list("sub").await.unwrap();
    let paths: Vec<_> = sub.iter().map(DirItem::path).collect();
    assert_eq!(paths, vec!["sub/a.csv", "sub/b.csv"]);
    assert!(sub.iter().all(|item| !item.is_dir()));

    assert!(matches!(
        session.list("nope").await.unwrap_err(),
        DoiError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_dataverse_root_naming_a_file() {
    let mut server = Server::new_async().await;
    let _dataverse = mock_dataverse(&mut server).await;

    let (session, is_file) =
        DoiSession::connect("dv", "sub/a.csv", dataverse_options(), &client_config(&server))
            .await
            .unwrap();
    assert!(is_file);
    assert_eq!(session.root(), "sub");
    let entry = session.stat("a.csv").await.unwrap();
    assert_eq!(entry.remote_path, "a.csv");
    assert_eq!(entry.checksum, "bb");

    let (session, is_file) =
        DoiSession::connect("dv", "sub", dataverse_options(), &client_config(&server))
            .await
            .unwrap();
    assert!(!is_file);
    let listing = session.list("").await.unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].path(), "a.csv");
}

#[tokio::test]
async fn test_show_metadata_and_failed_set_keeps_session() {
    let mut server = Server::new_async().await;
    let _dataverse = mock_dataverse(&mut server).await;
    let _mock = server
        .mock("GET", "/api/handles/10.9999/missing")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let (session, _) = DoiSession::connect("dv", "", dataverse_options(), &client_config(&server))
        .await
        .unwrap();

    let metadata = session.command("show-metadata", &[]).await.unwrap();
    assert_eq!(metadata["status"], "OK");

    let err = session
        .command("set", &[("doi".into(), "10.9999/missing".into())])
        .await
        .unwrap_err();
    assert!(matches!(err, DoiError::Resolution { .. }));
    assert_eq!(session.doi(), "10.7910/DVN/ABC123");
    assert_eq!(session.list("sub").await.unwrap().len(), 2);

    let err = session
        .command("set", &[("provider".into(), "invenio".into())])
        .await
        .unwrap_err();
    assert!(matches!(err, DoiError::Config(_)));

    let err = session.command("reindex", &[]).await.unwrap_err();
    assert!(matches!(err, DoiError::CommandNotFound(_)));
}

#[tokio::test]
async fn test_set_rebinds_to_new_doi() {
    let mut server = Server::new_async().await;
    let _dataverse = mock_dataverse(&mut server).await;
    let _invenio = mock_invenio(&mut server).await;

    let (session, _) = DoiSession::connect("dv", "", dataverse_options(), &client_config(&server))
        .await
        .unwrap();
    assert_eq!(session.provider(), Provider::Dataverse);

    session
        .set(&[
            ("doi".into(), "10.1234/data.77".into()),
            ("provider".into(), "".into()),
        ])
        .await
        .unwrap();
    assert_eq!(session.provider(), Provider::Invenio);
    assert_eq!(session.doi(), "10.1234/data.77");
    assert_eq!(session.options().provider, None);
}

#[tokio::test]
async fn test_backend_is_read_only() {
    let mut server = Server::new_async().await;
    let _dataverse = mock_dataverse(&mut server).await;

    let (session, _) = DoiSession::connect("dv", "", dataverse_options(), &client_config(&server))
        .await
        .unwrap();
    let mut vfs = Vfs::new();
    vfs.mount("dv", Box::new(DoiBackend::new(session)));

    let info = vfs.info("dv").unwrap();
    assert!(info.read_only);
    assert_eq!(info.hashes, vec!["md5".to_string()]);
    assert_eq!(info.description, "DOI 10.7910/DVN/ABC123");

    // valid and invalid targets alike
    for raw in ["dv:README.md", "dv:sub", "dv:new.txt"] {
        let target = RemoteRef::parse(raw).unwrap();
        let kinds = [
            vfs.mkdir(&target).await.unwrap_err().kind(),
            vfs.rmdir(&target).await.unwrap_err().kind(),
            vfs.write(&target, b"data").await.unwrap_err().kind(),
            vfs.delete(&target).await.unwrap_err().kind(),
            vfs.set_modified(&target, chrono::Utc::now())
                .await
                .unwrap_err()
                .kind(),
        ];
        assert!(kinds.iter().all(|k| *k == io::ErrorKind::ReadOnlyFilesystem));
    }

    let err = vfs
        .write(&RemoteRef::parse("dv:x").unwrap(), b"")
        .await
        .unwrap_err();
    let inner = err.get_ref().and_then(|e| e.downcast_ref::<DoiError>());
    assert!(matches!(inner, Some(DoiError::ReadOnly)));
}

#[tokio::test]
async fn test_backend_metadata_and_listing() {
    let mut server = Server::new_async().await;
    let _dataverse = mock_dataverse(&mut server).await;

    let (session, _) = DoiSession::connect("dv", "", dataverse_options(), &client_config(&server))
        .await
        .unwrap();
    let mut vfs = Vfs::new();
    vfs.mount("dv", Box::new(DoiBackend::new(session)));

    let meta = vfs.metadata(&RemoteRef::parse("dv:sub").unwrap()).await.unwrap();
    assert_eq!(meta.kind, VfsEntryKind::Directory);
    let meta = vfs
        .metadata(&RemoteRef::parse("dv:sub/a.csv").unwrap())
        .await
        .unwrap();
    assert_eq!(meta.kind, VfsEntryKind::File);
    assert_eq!(meta.size, 3);
    assert!(meta.modified.is_some());

    assert!(!vfs.exists(&RemoteRef::parse("dv:ghost").unwrap()).await.unwrap());
    let md5 = vfs
        .hash(&RemoteRef::parse("dv:README.md").unwrap(), "md5")
        .await
        .unwrap();
    assert_eq!(md5.as_deref(), Some("aa"));
    let sha = vfs
        .hash(&RemoteRef::parse("dv:README.md").unwrap(), "sha1")
        .await
        .unwrap();
    assert_eq!(sha, None);

    let entries = vfs.list(&RemoteRef::parse("dv:").unwrap()).await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["README.md", "sub"]);
}

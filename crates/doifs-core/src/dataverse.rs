//! Dataverse: endpoint construction, file listing and directory synthesis.
//!
//! The dataset API hands back a flat file list where each file carries an
//! optional `directoryLabel`. Directories only exist implicitly, so listing
//! a directory rebuilds its immediate children from the flat set every time.

use std::collections::BTreeSet;

use log::{debug, warn};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

use crate::api::{DataverseDatasetResponse, DataverseFile};
use crate::entry::{DirItem, FileEntry, dedupe_entries, parse_modified};
use crate::error::{DoiError, Result};
use crate::http::HttpClient;

/// Characters escaped in the `persistentId` query value. `:` and `/` stay
/// literal, the Dataverse API expects `doi:10.x/Y` verbatim.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'%')
    .add(b'=')
    .add(b'`');

const PERSISTENT_ID: &str = "persistentId";

/// Build `<host>/api/datasets/:persistentId/?persistentId=<id>` from a landing page.
pub fn resolve_endpoint(resolved: &Url) -> Result<Url> {
    let pid = resolved
        .query_pairs()
        .find(|(k, _)| k == PERSISTENT_ID)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DoiError::EndpointDiscovery {
            url: resolved.to_string(),
            reason: "landing page has no persistentId query parameter".to_string(),
        })?;

    let mut endpoint = resolved
        .join("/api/datasets/:persistentId/")
        .map_err(|e| DoiError::EndpointDiscovery {
            url: resolved.to_string(),
            reason: e.to_string(),
        })?;
    endpoint.set_query(Some(&format!(
        "{}={}",
        PERSISTENT_ID,
        utf8_percent_encode(&pid, QUERY_VALUE)
    )));
    endpoint.set_fragment(None);
    debug!("dataverse endpoint = {}", endpoint);
    Ok(endpoint)
}

/// List the files of the dataset at `endpoint`.
///
/// Dataverse has no per-file timestamps, so every entry gets the version's
/// `lastUpdateTime`.
pub async fn list_files(client: &HttpClient, endpoint: &Url) -> Result<Vec<FileEntry>> {
    let response: DataverseDatasetResponse = client.get_json("list files", endpoint).await?;
    if !response.status.is_empty() && response.status != "OK" {
        return Err(DoiError::transport(
            "list files",
            endpoint.as_str(),
            format!("dataset API status {}", response.status),
        ));
    }

    let version = response.data.latest_version;
    let modified = parse_modified(&version.last_update_time, "lastUpdateTime");

    let mut entries = Vec::with_capacity(version.files.len());
    for file in version.files {
        let content_url = content_url(endpoint, file.data_file.id)?;
        let (name, size, content_type) = preferred_fields(&file);
        if name.is_empty() {
            warn!("skipping datafile {}: no file name", file.data_file.id);
            continue;
        }
        entries.push(FileEntry {
            remote_path: join_label(&file.directory_label, &name),
            content_url: content_url.to_string(),
            size,
            modified,
            content_type,
            checksum: file.data_file.md5,
        });
    }
    Ok(dedupe_entries(entries))
}

/// Original (pre-ingest) name, size and format win over the stored ones.
fn preferred_fields(file: &DataverseFile) -> (String, u64, String) {
    let data = &file.data_file;
    if data.original_file_name.is_empty() {
        return (data.filename.clone(), data.file_size, data.content_type.clone());
    }
    let content_type = if data.original_file_format.is_empty() {
        data.content_type.clone()
    } else {
        data.original_file_format.clone()
    };
    (
        data.original_file_name.clone(),
        data.original_file_size.unwrap_or(data.file_size),
        content_type,
    )
}

fn content_url(endpoint: &Url, id: i64) -> Result<Url> {
    let mut url = endpoint
        .join(&format!("/api/access/datafile/{}", id))
        .map_err(|e| DoiError::transport("list files", endpoint.as_str(), e))?;
    url.set_query(Some("format=original"));
    Ok(url)
}

fn join_label(label: &str, name: &str) -> String {
    let label = label.trim_matches('/');
    if label.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", label, name)
    }
}

/// The immediate children of `dir` ("" is the root) in a flat entry set.
///
/// Files whose parent is `dir` come back as files. Any deeper file
/// contributes the first path segment below `dir` as a directory, so
/// directories that only hold subdirectories are still reachable.
pub fn synthesize_listing(entries: &[FileEntry], dir: &str) -> Vec<DirItem> {
    let dir = dir.trim_matches('/');
    let mut items = Vec::new();
    let mut subdirs = BTreeSet::new();

    for entry in entries {
        let parent = match entry.remote_path.rsplit_once('/') {
            Some((parent, _)) => parent,
            None => "",
        };
        if parent == dir {
            items.push(DirItem::File(entry.clone()));
            continue;
        }
        let below = if dir.is_empty() {
            Some(parent)
        } else {
            parent
                .strip_prefix(dir)
                .and_then(|rest| rest.strip_prefix('/'))
        };
        if let Some(first) = below.and_then(|rest| rest.split('/').next()) {
            if !first.is_empty() {
                subdirs.insert(first.to_string());
            }
        }
    }

    items.extend(subdirs.into_iter().map(|name| DirItem::Directory {
        path: if dir.is_empty() {
            name
        } else {
            format!("{}/{}", dir, name)
        },
    }));
    items
}

/// Whether `dir` is a directory implied by some entry's path.
pub fn is_directory(entries: &[FileEntry], dir: &str) -> bool {
    let dir = dir.trim_matches('/');
    dir.is_empty()
        || entries.iter().any(|e| {
            e.remote_path
                .strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::UNSET_TIME;
    use mockito::Server;
    use serde_json::json;

    fn entry(path: &str) -> FileEntry {
        FileEntry {
            remote_path: path.into(),
            content_url: format!("https://dataverse.harvard.edu/api/access/datafile/{path}"),
            size: 1,
            modified: UNSET_TIME,
            content_type: String::new(),
            checksum: String::new(),
        }
    }

    #[test]
    fn test_endpoint_keeps_persistent_id_literal() {
        let landing = Url::parse(
            "https://dataverse.harvard.edu/dataset.xhtml?persistentId=doi:10.7910/DVN/ABC123",
        )
        .unwrap();
        let endpoint = resolve_endpoint(&landing).unwrap();
        assert!(endpoint.path().contains(":persistentId"));
        assert_eq!(endpoint.path(), "/api/datasets/:persistentId/");
        assert_eq!(endpoint.query(), Some("persistentId=doi:10.7910/DVN/ABC123"));
    }

    #[test]
    fn test_endpoint_requires_persistent_id() {
        let landing = Url::parse("https://dataverse.harvard.edu/dataset.xhtml?id=5").unwrap();
        assert!(matches!(
            resolve_endpoint(&landing),
            Err(DoiError::EndpointDiscovery { .. })
        ));
    }

    #[test]
    fn test_synthesis_root_and_subdir() {
        let entries = vec![entry("readme.txt"), entry("sub/a.csv"), entry("sub/b.csv")];

        let root = synthesize_listing(&entries, "");
        assert_eq!(root.len(), 2);
        assert_eq!(root[0], DirItem::File(entries[0].clone()));
        assert_eq!(root[1], DirItem::Directory { path: "sub".into() });

        let sub = synthesize_listing(&entries, "sub");
        assert_eq!(sub.len(), 2);
        assert!(sub.iter().all(|item| !item.is_dir()));
        assert_eq!(sub[0].path(), "sub/a.csv");
        assert_eq!(sub[1].path(), "sub/b.csv");
    }

    #[test]
    fn test_synthesis_nested_only_directory() {
        let entries = vec![entry("a/b/c.txt"), entry("a/d.txt"), entry("ab/e.txt")];

        let root = synthesize_listing(&entries, "");
        let names: Vec<_> = root.iter().map(DirItem::path).collect();
        assert_eq!(names, vec!["a", "ab"]);

        let a = synthesize_listing(&entries, "a/");
        let names: Vec<_> = a.iter().map(DirItem::path).collect();
        assert_eq!(names, vec!["a/d.txt", "a/b"]);

        assert!(synthesize_listing(&entries, "missing").is_empty());
    }

    #[test]
    fn test_is_directory() {
        let entries = vec![entry("a/b/c.txt")];
        assert!(is_directory(&entries, ""));
        assert!(is_directory(&entries, "a"));
        assert!(is_directory(&entries, "a/b"));
        assert!(!is_directory(&entries, "a/b/c.txt"));
        assert!(!is_directory(&entries, "a/b/c"));
    }

    #[tokio::test]
    async fn test_list_files_prefers_original_fields() {
        let mut server = Server::new_async().await;
        let body = json!({
            "status": "OK",
            "data": {"latestVersion": {
                "lastUpdateTime": "2024-05-01T12:00:00Z",
                "files": [
                    {"directoryLabel": "", "dataFile": {
                        "id": 11, "filename": "data.tab", "contentType": "text/tab-separated-values",
                        "filesize": 100, "originalFileFormat": "text/csv",
                        "originalFileSize": 120, "originalFileName": "data.csv", "md5": "aa"
                    }},
                    {"directoryLabel": "sub/", "dataFile": {
                        "id": 12, "filename": "notes.txt", "contentType": "text/plain",
                        "filesize": 7, "md5": "bb"
                    }}
                ]
            }}
        });
        let _mock = server
            .mock("GET", "/api/datasets/:persistentId/")
            .match_query(mockito::Matcher::UrlEncoded(
                "persistentId".into(),
                "doi:10.7910/DVN/ABC123".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = HttpClient::new("t").unwrap();
        let landing = Url::parse(&format!(
            "{}/dataset.xhtml?persistentId=doi:10.7910/DVN/ABC123",
            server.url()
        ))
        .unwrap();
        let endpoint = resolve_endpoint(&landing).unwrap();
        let entries = list_files(&client, &endpoint).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].remote_path, "data.csv");
        assert_eq!(entries[0].size, 120);
        assert_eq!(entries[0].content_type, "text/csv");
        assert_eq!(entries[0].checksum, "aa");
        assert_eq!(
            entries[0].content_url,
            format!("{}/api/access/datafile/11?format=original", server.url())
        );
        assert_eq!(entries[1].remote_path, "sub/notes.txt");
        assert_eq!(entries[1].size, 7);
        assert_eq!(entries[1].modified, entries[0].modified);
        assert!(entries[1].has_modified_time());
    }

    #[tokio::test]
    async fn test_list_files_bad_update_time_is_unset() {
        let mut server = Server::new_async().await;
        let body = json!({
            "status": "OK",
            "data": {"latestVersion": {
                "lastUpdateTime": "not a time",
                "files": [{"dataFile": {"id": 1, "filename": "x.bin", "filesize": 3}}]
            }}
        });
        let _mock = server
            .mock("GET", "/api/datasets/:persistentId/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = HttpClient::new("t").unwrap();
        let endpoint = Url::parse(&format!(
            "{}/api/datasets/:persistentId/?persistentId=doi:10.1/X",
            server.url()
        ))
        .unwrap();
        let entries = list_files(&client, &endpoint).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].modified, UNSET_TIME);
    }

    #[tokio::test]
    async fn test_list_files_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/datasets/:persistentId/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(json!({"status": "ERROR", "message": "nope"}).to_string())
            .create_async()
            .await;

        let client = HttpClient::new("t").unwrap();
        let endpoint = Url::parse(&format!(
            "{}/api/datasets/:persistentId/?persistentId=doi:10.1/X",
            server.url()
        ))
        .unwrap();
        let err = list_files(&client, &endpoint).await.unwrap_err();
        assert!(matches!(err, DoiError::Transport { .. }));
    }
}

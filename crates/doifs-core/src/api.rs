//! Wire types for the provider APIs.
//!
//! Fields default when absent so that a provider adding or dropping optional
//! attributes does not break a listing. Only the attributes the listers read
//! are modelled.

use serde::Deserialize;

// ============================================================================
// Invenio (Zenodo and generic InvenioRDM installations)
// ============================================================================

/// `GET <base>/api/records/<id>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvenioRecordResponse {
    pub links: InvenioRecordLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvenioRecordLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// `GET <endpoint>/files`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvenioFilesResponse {
    pub entries: Vec<InvenioFileEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvenioFileEntry {
    pub key: String,
    pub checksum: String,
    pub size: u64,
    pub updated: String,
    pub mimetype: String,
    pub links: InvenioFileLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InvenioFileLinks {
    pub content: String,
}

// ============================================================================
// Dataverse
// ============================================================================

/// `GET <base>/api/datasets/:persistentId/?persistentId=<id>`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataverseDatasetResponse {
    pub status: String,
    pub data: DataverseDataset,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataverseDataset {
    pub latest_version: DataverseDatasetVersion,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataverseDatasetVersion {
    pub last_update_time: String,
    pub files: Vec<DataverseFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataverseFile {
    pub directory_label: String,
    pub data_file: DataverseDataFile,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DataverseDataFile {
    pub id: i64,
    pub filename: String,
    pub content_type: String,
    #[serde(rename = "filesize")]
    pub file_size: u64,
    pub original_file_format: String,
    pub original_file_size: Option<u64>,
    pub original_file_name: String,
    pub md5: String,
}

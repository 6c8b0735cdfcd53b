use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::VaultError;

pub const INVENTORY_FIELDS: [&str; 5] = [
    "ArchiveId",
    "ArchiveDescription",
    "CreationDate",
    "Size",
    "SHA256TreeHash",
];

#[derive(Deserialize)]
struct Inventory {
    #[serde(rename = "ArchiveList")]
    archive_list: Vec<Map<String, Value>>,
}

/// Renders an inventory job's `ArchiveList` as CSV with a fixed header.
/// Unknown archive fields are dropped; a missing one is an error.
pub fn json_inventory_to_csv(json_data: &str) -> Result<String, VaultError> {
    let inventory: Inventory = serde_json::from_str(json_data)?;

    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(INVENTORY_FIELDS)?;

    for (index, archive) in inventory.archive_list.iter().enumerate() {
        let mut row = Vec::with_capacity(INVENTORY_FIELDS.len());
        for field in INVENTORY_FIELDS {
            let value = archive
                .get(field)
                .ok_or(VaultError::MissingInventoryField { index, field })?;
            row.push(csv_field(value));
        }
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| VaultError::Io(err.into_error()))?;

    Ok(String::from_utf8(bytes)?)
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HEADER: &str = "ArchiveId,ArchiveDescription,CreationDate,Size,SHA256TreeHash";

    #[test]
    fn test_empty_archive_list() {
        let csv = json_inventory_to_csv(r#"{"ArchiveList": []}"#).unwrap();
        assert_eq!(csv, format!("{}\r\n", HEADER));
    }

    #[test]
    fn test_rows_in_header_order() {
        let inventory = json!({
            "VaultARN": "arn:aws:glacier:us-east-1:123456789012:vaults/v1",
            "InventoryDate": "2024-01-01T00:00:00Z",
            "ArchiveList": [
                {
                    "SHA256TreeHash": "aa",
                    "Size": 11,
                    "CreationDate": "2024-01-01T00:00:00Z",
                    "ArchiveDescription": "test",
                    "ArchiveId": "id-1",
                    "Extra": "dropped"
                },
                {
                    "ArchiveId": "id-2",
                    "ArchiveDescription": "has, comma",
                    "CreationDate": "2024-01-02T00:00:00Z",
                    "Size": 0,
                    "SHA256TreeHash": null
                }
            ]
        });

        let csv = json_inventory_to_csv(&inventory.to_string()).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "id-1,test,2024-01-01T00:00:00Z,11,aa");
        assert_eq!(lines[2], "id-2,\"has, comma\",2024-01-02T00:00:00Z,0,");
        assert_eq!(lines[3], "");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_missing_field_fails() {
        let inventory = json!({
            "ArchiveList": [
                {"ArchiveId": "id-1", "ArchiveDescription": "", "CreationDate": "", "Size": 1}
            ]
        });

        let err = json_inventory_to_csv(&inventory.to_string()).unwrap_err();
        assert!(matches!(
            err,
            VaultError::MissingInventoryField {
                index: 0,
                field: "SHA256TreeHash"
            }
        ));
    }

    #[test]
    fn test_not_an_inventory() {
        assert!(matches!(
            json_inventory_to_csv("hello world"),
            Err(VaultError::InventoryJson(_))
        ));
        assert!(matches!(
            json_inventory_to_csv(r#"{"VaultARN": "x"}"#),
            Err(VaultError::InventoryJson(_))
        ));
    }
}

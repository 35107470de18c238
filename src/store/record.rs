//! On-disk record schema for one (locale, module) pair.
//!
//! Records are XML files of ordered rows plus a module-level counter:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <translation>
//!     <row id="1" trigger="src/app:1">
//!         <value>hello there</value>
//!         <comment/>
//!     </row>
//!     <counter>1</counter>
//! </translation>
//! ```
//!
//! Re-serializing an unmodified load reproduces row order and field values;
//! only insignificant whitespace may differ.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// One persisted translation record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "translation")]
pub struct TranslationFile {
    #[serde(rename = "row", default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub counter: u32,
}

/// One translatable string as persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "@id")]
    pub id: u32,
    #[serde(rename = "@trigger")]
    pub trigger: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub comment: String,
}

impl TranslationFile {
    pub fn from_xml(content: &str) -> Result<Self> {
        quick_xml::de::from_str(content).context("malformed translation record")
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut out = String::from(XML_HEADER);
        let mut ser = quick_xml::se::Serializer::new(&mut out);
        ser.indent(' ', 4);
        self.serialize(ser)
            .context("failed to encode translation record")?;
        out.push('\n');
        Ok(out)
    }
}

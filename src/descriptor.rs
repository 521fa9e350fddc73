//! Request descriptors: the static, per-operation definition of an exchange.
//!
//! Every operation the service offers is described by one
//! [`RequestDescriptor`]: which endpoint to POST to, which multipart fields
//! it accepts, and what the downloaded artifact should be called when the
//! user leaves the output name blank. The seven built-in operations live in
//! a single table keyed by [`Operation`], so adding an operation is one table
//! row rather than another copy of the whole submit/receive control flow.
//!
//! Descriptors are immutable and `'static`; field order is insertion order
//! and carries no semantics.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::fmt;

/// The shape of one multipart field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// The primary upload: an image/video file or a zip of pictures.
    BinaryFile,
    /// A second upload identifying *whom* to blur (specific-person variants).
    ReferenceBinaryFile,
    /// A remote URL the server fetches instead of an upload.
    TextLink,
    /// Free-text guidance for the transform (e.g. "redact all names").
    TextInstruction,
    /// The name the user wants the produced artifact to carry.
    TextOutputName,
}

/// Whether a field must be present for the request to be submittable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Must always be present.
    Required,
    /// May be omitted entirely.
    Optional,
    /// Member of the descriptor's alternative group: at least one
    /// `Alternative` field must be present (the file-or-link pattern).
    Alternative,
}

/// One field a descriptor accepts, under its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Multipart field name on the wire.
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldDescriptor {
    const fn new(name: &'static str, kind: FieldKind, presence: Presence) -> Self {
        Self { name, kind, presence }
    }

    /// True for kinds that carry bytes rather than text.
    pub fn is_binary(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::BinaryFile | FieldKind::ReferenceBinaryFile
        )
    }
}

/// Static definition of one service operation.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDescriptor {
    /// Path appended to the configured base URL, e.g. `/redact-pdf`.
    pub endpoint_path: &'static str,
    /// Accepted fields, in declaration order.
    pub fields: Vec<FieldDescriptor>,
    /// Artifact filename used when the user leaves the output name blank.
    pub default_output_name: &'static str,
}

impl RequestDescriptor {
    /// Look up a field by wire name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The descriptor's alternative group, empty when it has none.
    pub fn alternative_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| f.presence == Presence::Alternative)
            .collect()
    }
}

/// The seven operations the anonymization service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    /// Blur all eyes in a zip of pictures.
    EyesInPictures,
    /// Blur all eyes in a video (upload or link).
    EyesInVideo,
    /// Blur all faces in a zip of pictures.
    FacesInPictures,
    /// Blur all faces in a video (upload or link).
    FacesInVideo,
    /// Blur one person's face in a zip of pictures, given reference shots.
    SpecificFacesInPictures,
    /// Blur one person's face in a video, given a reference shot.
    SpecificFacesInVideo,
    /// Redact content from a PDF according to a free-text instruction.
    RedactPdf,
}

impl Operation {
    /// All operations, in a stable order.
    pub const ALL: [Operation; 7] = [
        Operation::EyesInPictures,
        Operation::EyesInVideo,
        Operation::FacesInPictures,
        Operation::FacesInVideo,
        Operation::SpecificFacesInPictures,
        Operation::SpecificFacesInVideo,
        Operation::RedactPdf,
    ];

    /// The descriptor for this operation.
    pub fn descriptor(&self) -> &'static RequestDescriptor {
        let idx = match self {
            Operation::EyesInPictures => 0,
            Operation::EyesInVideo => 1,
            Operation::FacesInPictures => 2,
            Operation::FacesInVideo => 3,
            Operation::SpecificFacesInPictures => 4,
            Operation::SpecificFacesInVideo => 5,
            Operation::RedactPdf => 6,
        };
        &DESCRIPTORS[idx]
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::EyesInPictures => "eyes-in-pictures",
            Operation::EyesInVideo => "eyes-in-video",
            Operation::FacesInPictures => "faces-in-pictures",
            Operation::FacesInVideo => "faces-in-video",
            Operation::SpecificFacesInPictures => "specific-faces-in-pictures",
            Operation::SpecificFacesInVideo => "specific-faces-in-video",
            Operation::RedactPdf => "redact-pdf",
        };
        f.write_str(s)
    }
}

use FieldKind::*;
use Presence::*;

/// Descriptor table, indexed in [`Operation::ALL`] order.
///
/// Wire names, endpoint paths and default output names match the service's
/// HTTP surface exactly; picture operations take zip uploads, video
/// operations take a file-or-link alternative pair.
static DESCRIPTORS: Lazy<[RequestDescriptor; 7]> = Lazy::new(|| {
    [
        RequestDescriptor {
            endpoint_path: "/blur-eyes-in-pictures",
            fields: vec![
                FieldDescriptor::new("zip_file", BinaryFile, Required),
                FieldDescriptor::new("output_filename", TextOutputName, Optional),
            ],
            default_output_name: "output.zip",
        },
        RequestDescriptor {
            endpoint_path: "/blur-eyes",
            fields: vec![
                FieldDescriptor::new("file", BinaryFile, Alternative),
                FieldDescriptor::new("link", TextLink, Alternative),
                FieldDescriptor::new("output_filename", TextOutputName, Optional),
            ],
            default_output_name: "output",
        },
        RequestDescriptor {
            endpoint_path: "/blur-faces-in-pictures",
            fields: vec![
                FieldDescriptor::new("zip_file", BinaryFile, Required),
                FieldDescriptor::new("output_filename", TextOutputName, Optional),
            ],
            default_output_name: "output.zip",
        },
        RequestDescriptor {
            endpoint_path: "/blur-faces",
            fields: vec![
                FieldDescriptor::new("file", BinaryFile, Alternative),
                FieldDescriptor::new("link", TextLink, Alternative),
                FieldDescriptor::new("output_filename", TextOutputName, Optional),
            ],
            default_output_name: "output",
        },
        RequestDescriptor {
            endpoint_path: "/blur-specific-person-in-pictures",
            fields: vec![
                FieldDescriptor::new("zip_file", BinaryFile, Required),
                FieldDescriptor::new("reference_zip_file", ReferenceBinaryFile, Required),
                FieldDescriptor::new("output_filename", TextOutputName, Optional),
            ],
            default_output_name: "output.zip",
        },
        RequestDescriptor {
            endpoint_path: "/blur-person",
            fields: vec![
                FieldDescriptor::new("file", BinaryFile, Alternative),
                FieldDescriptor::new("reference_file", ReferenceBinaryFile, Required),
                FieldDescriptor::new("link", TextLink, Alternative),
                FieldDescriptor::new("output_filename", TextOutputName, Optional),
            ],
            default_output_name: "output",
        },
        RequestDescriptor {
            endpoint_path: "/redact-pdf",
            fields: vec![
                FieldDescriptor::new("pdf_file", BinaryFile, Required),
                FieldDescriptor::new("instruction", TextInstruction, Optional),
                FieldDescriptor::new("output_filename", TextOutputName, Optional),
            ],
            default_output_name: "redacted_output.pdf",
        },
    ]
});

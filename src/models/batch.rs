// src/models/batch.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

/// Um elemento do payload bulk. O discriminante `op` é explícito:
///
/// ```json
/// [
///   { "op": "insert", "name": "Wasser", "price": 3.5 },
///   { "op": "update", "id": 2, "name": "Hot Dog Kids", "price": 6.5 },
///   { "op": "delete", "id": 4 }
/// ]
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum BatchOp<F> {
    Insert {
        #[serde(flatten)]
        fields: F,
    },
    Update {
        id: i64,
        #[serde(flatten)]
        fields: F,
    },
    Delete {
        id: i64,
    },
}

impl<F> BatchOp<F> {
    pub fn fields(&self) -> Option<&F> {
        match self {
            BatchOp::Insert { fields } | BatchOp::Update { fields, .. } => Some(fields),
            BatchOp::Delete { .. } => None,
        }
    }

    pub fn map_fields<G>(self, f: impl FnOnce(F) -> G) -> BatchOp<G> {
        match self {
            BatchOp::Insert { fields } => BatchOp::Insert { fields: f(fields) },
            BatchOp::Update { id, fields } => BatchOp::Update { id, fields: f(fields) },
            BatchOp::Delete { id } => BatchOp::Delete { id },
        }
    }
}

/// Valida todos os elementos antes de qualquer escrita.
pub fn validate_batch<F: Validate>(ops: &[BatchOp<F>]) -> Result<(), ValidationErrors> {
    ops.iter()
        .filter_map(BatchOp::fields)
        .try_for_each(|fields| fields.validate())
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct BatchOutcome {
    pub ok: bool,
    pub inserted: u32,
    pub updated: u32,
    pub deleted: u32,
    /// Deletes/updates ignorados (registro inexistente ou protegido).
    pub skipped: u32,
    /// Usuários cuja alteração foi revertida para manter um admin ativo.
    pub warnings: Vec<String>,
}

impl BatchOutcome {
    pub fn new() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }
}

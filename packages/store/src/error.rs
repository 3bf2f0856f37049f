use crate::record::ClientId;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Record {0} is not loaded in this store")]
    UnknownRecord(ClientId),

    #[error("Cannot assign id {id} to record {record}: {type_name} {id} is already loaded as record {existing}")]
    IdConflict {
        type_name: String,
        id: String,
        record: ClientId,
        existing: ClientId,
    },
}

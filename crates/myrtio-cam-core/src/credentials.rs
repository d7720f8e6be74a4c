//! The on-device table of known network credentials.
//!
//! Persisted as one fixed-size record in the blob store. The layout is
//! frozen: devices in the field carry records written by earlier firmware,
//! and a size change must read as "absent" rather than as garbage.

/// Number of credential slots.
pub const SLOT_COUNT: usize = 10;
/// Bytes per name/password field, including the NUL terminator.
pub const FIELD_LEN: usize = 32;
/// Encoded record size: `i32` last index plus both string arrays.
pub const RECORD_SIZE: usize = 4 + 2 * SLOT_COUNT * FIELD_LEN;

/// Two-part name of a persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordKey {
    pub namespace: &'static str,
    pub name: &'static str,
}

/// Where the credential table lives in the blob store.
pub const CREDENTIAL_RECORD: RecordKey = RecordKey {
    namespace: "LoginData",
    name: "LoginTab",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The underlying storage driver failed.
    Driver,
}

/// Opaque persistent key/value storage.
///
/// `read_record` returns the stored record length, which may differ from
/// the caller's expectation; only up to `buf.len()` bytes are filled.
/// `Ok(None)` means no record exists under the key.
#[allow(async_fn_in_trait)]
pub trait BlobStore {
    async fn read_record(
        &mut self,
        key: &RecordKey,
        buf: &mut [u8],
    ) -> Result<Option<usize>, StorageError>;

    async fn write_record(&mut self, key: &RecordKey, data: &[u8]) -> Result<(), StorageError>;
}

/// Fixed-size ordered table of known credentials plus a last-used hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialTable {
    last_index: i32,
    names: [[u8; FIELD_LEN]; SLOT_COUNT],
    passwords: [[u8; FIELD_LEN]; SLOT_COUNT],
}

impl CredentialTable {
    /// A zeroed table: every slot empty.
    pub const fn empty() -> Self {
        Self {
            last_index: 0,
            names: [[0; FIELD_LEN]; SLOT_COUNT],
            passwords: [[0; FIELD_LEN]; SLOT_COUNT],
        }
    }

    /// The last-used slot, if the stored hint is in range.
    pub fn last_index(&self) -> Option<usize> {
        usize::try_from(self.last_index)
            .ok()
            .filter(|i| *i < SLOT_COUNT)
    }

    pub fn set_last_index(&mut self, index: usize) {
        debug_assert!(index < SLOT_COUNT);
        self.last_index = index as i32;
    }

    /// The credentials in one slot; `None` for empty slots or slots whose
    /// stored bytes are not valid UTF-8.
    pub fn entry(&self, index: usize) -> Option<(&str, &str)> {
        let name = field_str(self.names.get(index)?)?;
        if name.is_empty() {
            return None;
        }
        let password = field_str(&self.passwords[index])?;
        Some((name, password))
    }

    /// Store a credential pair, truncating to the field capacity.
    pub fn set_entry(&mut self, index: usize, name: &str, password: &str) {
        set_field(&mut self.names[index], name);
        set_field(&mut self.passwords[index], password);
    }

    pub fn clear_entry(&mut self, index: usize) {
        self.names[index] = [0; FIELD_LEN];
        self.passwords[index] = [0; FIELD_LEN];
    }

    /// Serialize to the persisted layout: little-endian `lastIndex`,
    /// then all names, then all passwords.
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[0..4].copy_from_slice(&self.last_index.to_le_bytes());
        let mut offset = 4;
        for name in &self.names {
            out[offset..offset + FIELD_LEN].copy_from_slice(name);
            offset += FIELD_LEN;
        }
        for password in &self.passwords {
            out[offset..offset + FIELD_LEN].copy_from_slice(password);
            offset += FIELD_LEN;
        }
        out
    }

    /// Decode a persisted record. Any size other than [`RECORD_SIZE`]
    /// yields `None`; the caller treats that the same as an absent record.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() != RECORD_SIZE {
            return None;
        }
        let mut table = Self::empty();
        table.last_index = i32::from_le_bytes(data[0..4].try_into().ok()?);
        let mut offset = 4;
        for name in &mut table.names {
            name.copy_from_slice(&data[offset..offset + FIELD_LEN]);
            offset += FIELD_LEN;
        }
        for password in &mut table.passwords {
            password.copy_from_slice(&data[offset..offset + FIELD_LEN]);
            offset += FIELD_LEN;
        }
        Some(table)
    }
}

impl Default for CredentialTable {
    fn default() -> Self {
        Self::empty()
    }
}

fn field_str(field: &[u8; FIELD_LEN]) -> Option<&str> {
    let end = field.iter().position(|b| *b == 0).unwrap_or(FIELD_LEN);
    core::str::from_utf8(&field[..end]).ok()
}

fn set_field(field: &mut [u8; FIELD_LEN], value: &str) {
    *field = [0; FIELD_LEN];
    let bytes = value.as_bytes();
    let len = bytes.len().min(FIELD_LEN - 1);
    field[..len].copy_from_slice(&bytes[..len]);
}

/// Load the credential table, reinitializing the store when the record is
/// absent or its size does not match the expected layout.
pub async fn load_or_init<S: BlobStore>(store: &mut S) -> Result<CredentialTable, StorageError> {
    let mut buf = [0u8; RECORD_SIZE];
    match store.read_record(&CREDENTIAL_RECORD, &mut buf).await? {
        Some(len) if len == RECORD_SIZE => {
            if let Some(table) = CredentialTable::decode(&buf) {
                return Ok(table);
            }
            Ok(CredentialTable::empty())
        }
        _ => {
            let table = CredentialTable::empty();
            store
                .write_record(&CREDENTIAL_RECORD, &table.encode())
                .await?;
            Ok(table)
        }
    }
}

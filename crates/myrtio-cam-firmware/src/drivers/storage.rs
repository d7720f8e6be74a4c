//! Flash-backed record store for the settings partition.
//!
//! Records live at fixed offsets inside the settings partition, each
//! framed by a magic header and a stored length so a blank or torn sector
//! reads as "absent" instead of as data.

use embedded_storage::nor_flash::{NorFlash, ReadNorFlash};
use esp_storage::FlashStorage;
use myrtio_cam_core::credentials::{BlobStore, CREDENTIAL_RECORD, RecordKey, StorageError};

use crate::config::SETTINGS_PARTITION_OFFSET;

const BLOCK_SIZE: u32 = 4096;
const MAGIC_HEADER: u16 = 0xBEEF;
/// Magic plus a little-endian `u32` record length.
const FRAME_HEADER_SIZE: usize = 2 + 4;
/// Upper bound on one framed record, header included.
const STAGING_SIZE: usize = 1024;

/// [`BlobStore`] over the on-chip NOR flash.
///
/// Uses a raw pointer to the flash peripheral: the flash is owned by one
/// task at a time and this store is its only user.
pub struct FlashBlobStore {
    flash: *mut FlashStorage<'static>,
}

// Safety: the store is owned by the connectivity manager, which runs in a
// single task; the raw pointer is never accessed concurrently.
unsafe impl Send for FlashBlobStore {}

impl FlashBlobStore {
    pub fn new(flash: *mut FlashStorage<'static>) -> Self {
        Self { flash }
    }

    /// Each known record key maps to its own erase block inside the
    /// settings partition.
    fn record_addr(key: &RecordKey) -> Result<u32, StorageError> {
        if *key == CREDENTIAL_RECORD {
            Ok(SETTINGS_PARTITION_OFFSET)
        } else {
            Err(StorageError::Driver)
        }
    }
}

impl BlobStore for FlashBlobStore {
    async fn read_record(
        &mut self,
        key: &RecordKey,
        buf: &mut [u8],
    ) -> Result<Option<usize>, StorageError> {
        let addr = Self::record_addr(key)?;
        // Safety: sole flash user, see the Send impl.
        let flash = unsafe { &mut *self.flash };

        let mut header = [0u8; FRAME_HEADER_SIZE];
        flash
            .read(addr, &mut header)
            .map_err(|_| StorageError::Driver)?;

        let magic = u16::from_le_bytes([header[0], header[1]]);
        if magic != MAGIC_HEADER {
            return Ok(None);
        }
        let stored_len = u32::from_le_bytes([header[2], header[3], header[4], header[5]]) as usize;
        if stored_len > STAGING_SIZE - FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let wanted = stored_len.min(buf.len());
        flash
            .read(addr + FRAME_HEADER_SIZE as u32, &mut buf[..wanted])
            .map_err(|_| StorageError::Driver)?;
        Ok(Some(stored_len))
    }

    async fn write_record(&mut self, key: &RecordKey, data: &[u8]) -> Result<(), StorageError> {
        let addr = Self::record_addr(key)?;
        if data.len() > STAGING_SIZE - FRAME_HEADER_SIZE {
            return Err(StorageError::Driver);
        }
        // Safety: sole flash user, see the Send impl.
        let flash = unsafe { &mut *self.flash };

        // Frame header and payload go out as one write, padded to the
        // flash word size.
        let mut staging = [0u8; STAGING_SIZE];
        staging[0..2].copy_from_slice(&MAGIC_HEADER.to_le_bytes());
        staging[2..6].copy_from_slice(&(data.len() as u32).to_le_bytes());
        staging[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + data.len()].copy_from_slice(data);
        let write_len = (FRAME_HEADER_SIZE + data.len()).next_multiple_of(4);

        flash
            .erase(addr, addr + BLOCK_SIZE)
            .map_err(|_| StorageError::Driver)?;
        flash
            .write(addr, &staging[..write_len])
            .map_err(|_| StorageError::Driver)
    }
}

//! # 隐写解码模块
//!
//! 与编码器使用完全相同的位布局。流中读出的长度字段一律视为不可信输入：
//! 在分配内存或循环读取之前，先与剩余的流长度做边界检查。

use crate::capacity::MAGIC_CARRIER_BYTES;
use crate::carrier::CarrierSource;
use crate::constants::{
    BMP_HEADER_SIZE, BYTE_CARRIER_LEN, CHUNK_PAYLOAD_LEN, LENGTH_CARRIER_LEN, MAGIC_MARKER,
    MAGIC_MARKER_LEN, MAX_EXTENSION_LEN,
};
use crate::error::{Result, StegoError};
use crate::lsb;
use crate::payload::Extension;
use log::{debug, info};
use std::io::{Read, Seek, Write};

/// 解码结果：恢复出的扩展名与负载长度。负载本身已写入调用方提供的输出流。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub extension: Extension,
    pub payload_len: u64,
}

/// 已验证标记并读出扩展名和负载长度、尚未提取负载的解码器。
#[derive(Debug)]
pub struct StegoDecoder<R> {
    source: CarrierSource<R>,
    extension: Extension,
    payload_len: u32,
}

impl<R: Read + Seek> StegoDecoder<R> {
    /// 跳过头部，依次校验标记、读出扩展名长度与扩展名、读出负载长度。
    ///
    /// 源流只会被读取，不会被修改。
    pub fn open(stego: R) -> Result<Self> {
        let mut source = CarrierSource::new(stego)?;
        source.ensure_remaining("BMP header", BMP_HEADER_SIZE as u64)?;
        source.seek_to(BMP_HEADER_SIZE as u64)?;
        info!("Opening of stego image successful");

        let mut carrier = [0u8; MAGIC_CARRIER_BYTES as usize];
        source.read_run("magic marker", &mut carrier)?;
        let mut magic = [0u8; MAGIC_MARKER_LEN];
        lsb::unpack_bytes(&carrier, &mut magic);
        if &magic != MAGIC_MARKER {
            debug!("Found marker {magic:02x?}, expected {MAGIC_MARKER:02x?}");
            return Err(StegoError::NotSteganographic);
        }
        info!("Decoding of magic marker successful");

        let extension_len = read_length(&mut source, "extension length")? as usize;
        if extension_len > MAX_EXTENSION_LEN {
            return Err(StegoError::ExtensionMismatch(format!(
                "declared length {extension_len} exceeds {MAX_EXTENSION_LEN}"
            )));
        }
        info!("Decoding of secret file extension size successful");

        let mut raw = vec![0u8; extension_len];
        read_bytes(&mut source, "extension", &mut raw)?;
        let extension = Extension::parse(&raw).map_err(StegoError::ExtensionMismatch)?;
        info!("Decoding of secret file extension '{extension}' successful");

        let payload_len = read_length(&mut source, "payload length")?;
        source.ensure_remaining(
            "payload data",
            u64::from(payload_len) * BYTE_CARRIER_LEN as u64,
        )?;
        info!("Decoding of secret file size successful ({payload_len} bytes)");

        Ok(Self {
            source,
            extension,
            payload_len,
        })
    }

    pub fn extension(&self) -> &Extension {
        &self.extension
    }

    pub fn payload_len(&self) -> u32 {
        self.payload_len
    }

    /// 分批提取负载并立即写入 `out`，返回写出的字节数。
    pub fn extract_to<W: Write>(mut self, mut out: W) -> Result<u64> {
        let total = u64::from(self.payload_len);
        let mut done = 0u64;
        let mut carrier = Vec::with_capacity(CHUNK_PAYLOAD_LEN * BYTE_CARRIER_LEN);
        let mut chunk = Vec::with_capacity(CHUNK_PAYLOAD_LEN);

        while done < total {
            let n = (total - done).min(CHUNK_PAYLOAD_LEN as u64) as usize;
            carrier.resize(n * BYTE_CARRIER_LEN, 0);
            chunk.resize(n, 0);
            self.source.read_run("payload data", &mut carrier)?;
            lsb::unpack_bytes(&carrier, &mut chunk);
            out.write_all(&chunk)?;
            done += n as u64;
        }
        out.flush()?;
        info!("Decoding of secret file data successful");
        Ok(done)
    }
}

fn read_length<R: Read + Seek>(source: &mut CarrierSource<R>, field: &'static str) -> Result<u32> {
    let mut carrier = [0u8; LENGTH_CARRIER_LEN];
    source.read_run(field, &mut carrier)?;
    Ok(lsb::unpack_length(&carrier))
}

fn read_bytes<R: Read + Seek>(
    source: &mut CarrierSource<R>,
    field: &'static str,
    out: &mut [u8],
) -> Result<()> {
    let mut carrier = vec![0u8; out.len() * BYTE_CARRIER_LEN];
    source.read_run(field, &mut carrier)?;
    lsb::unpack_bytes(&carrier, out);
    Ok(())
}

/// 便捷入口：完整解码一个隐写流，负载写入 `out`。
pub fn decode<R, W>(stego: R, out: W) -> Result<Recovered>
where
    R: Read + Seek,
    W: Write,
{
    let decoder = StegoDecoder::open(stego)?;
    let extension = decoder.extension().clone();
    let payload_len = decoder.extract_to(out)?;
    Ok(Recovered {
        extension,
        payload_len,
    })
}

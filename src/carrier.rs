//! # BMP 载体流模块
//!
//! 提供对图像字节流的最小抽象：定位、按运行长度读取、按运行长度写入。
//! 编码器和解码器只通过这里访问文件，保证源与目标按字节同步推进，
//! 并把读到流末尾的情况统一报告为 [`StegoError::TruncatedStream`]。

use crate::capacity::image_capacity_bytes;
use crate::constants::{BMP_HEADER_SIZE, BMP_HEIGHT_OFFSET, BMP_WIDTH_OFFSET, BYTES_PER_PIXEL};
use crate::error::{Result, StegoError};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};

const SIGNATURE: &[u8; 2] = b"BM";
const PIXEL_OFFSET_OFFSET: usize = 10;
const INFO_HEADER_SIZE_OFFSET: usize = 14;
const BITS_PER_PIXEL_OFFSET: usize = 28;
const COMPRESSION_OFFSET: usize = 30;
const BITMAPINFOHEADER_SIZE: u32 = 40;

fn le_u16(raw: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([raw[offset], raw[offset + 1]])
}

fn le_u32(raw: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        raw[offset],
        raw[offset + 1],
        raw[offset + 2],
        raw[offset + 3],
    ])
}

fn le_i32(raw: &[u8], offset: usize) -> i32 {
    le_u32(raw, offset) as i32
}

/// 54 字节的 BMP 头部。
///
/// 编码时头部被原样复制到输出；这里只读取宽、高以及用于拒绝不支持变体的几个字段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeader {
    raw: [u8; BMP_HEADER_SIZE],
    width: u32,
    height: u32,
}

impl BmpHeader {
    /// 解析并校验头部。只接受无压缩、自底向上、24 位、使用 BITMAPINFOHEADER 的 BMP。
    pub fn parse(raw: [u8; BMP_HEADER_SIZE]) -> Result<Self> {
        let unsupported = |reason: String| Err(StegoError::UnsupportedImage(reason));

        if &raw[..2] != SIGNATURE {
            return unsupported("missing 'BM' signature".to_string());
        }
        let info_size = le_u32(&raw, INFO_HEADER_SIZE_OFFSET);
        if info_size != BITMAPINFOHEADER_SIZE {
            return unsupported(format!(
                "info header of {info_size} bytes, only {BITMAPINFOHEADER_SIZE} is supported"
            ));
        }
        let pixel_offset = le_u32(&raw, PIXEL_OFFSET_OFFSET);
        if pixel_offset as usize != BMP_HEADER_SIZE {
            return unsupported(format!(
                "pixel data starts at {pixel_offset}, expected {BMP_HEADER_SIZE}"
            ));
        }
        let bits_per_pixel = le_u16(&raw, BITS_PER_PIXEL_OFFSET);
        if bits_per_pixel != 24 {
            return unsupported(format!("{bits_per_pixel} bits per pixel, expected 24"));
        }
        let compression = le_u32(&raw, COMPRESSION_OFFSET);
        if compression != 0 {
            return unsupported(format!("compression method {compression}"));
        }

        let width = le_i32(&raw, BMP_WIDTH_OFFSET);
        let height = le_i32(&raw, BMP_HEIGHT_OFFSET);
        if width <= 0 {
            return unsupported(format!("width {width}"));
        }
        if height <= 0 {
            // 负高度表示自顶向下存储
            return unsupported(format!("height {height} (top-down or empty bitmap)"));
        }

        Ok(Self {
            raw,
            width: width as u32,
            height: height as u32,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 头部声明的载体容量 (字节)。
    pub fn capacity_bytes(&self) -> u64 {
        image_capacity_bytes(self.width, self.height, BYTES_PER_PIXEL)
    }

    pub fn as_bytes(&self) -> &[u8; BMP_HEADER_SIZE] {
        &self.raw
    }
}

/// 只读的载体源，记录当前位置与流的总长度，用于读取前的边界检查。
#[derive(Debug)]
pub struct CarrierSource<R> {
    inner: R,
    stream_len: u64,
    position: u64,
}

impl<R: Read + Seek> CarrierSource<R> {
    /// 包装一个可定位的读取器，并回到流的起点。
    pub fn new(mut inner: R) -> Result<Self> {
        let stream_len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self {
            inner,
            stream_len,
            position: 0,
        })
    }

    pub fn stream_len(&self) -> u64 {
        self.stream_len
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn remaining(&self) -> u64 {
        self.stream_len.saturating_sub(self.position)
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.position = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// 在读取或分配之前确认还剩至少 `needed` 个字节。
    pub fn ensure_remaining(&self, field: &'static str, needed: u64) -> Result<()> {
        let available = self.remaining();
        if needed > available {
            return Err(StegoError::TruncatedStream {
                field,
                needed,
                available,
            });
        }
        Ok(())
    }

    /// 读取接下来的 `buf.len()` 个字节。
    pub fn read_run(&mut self, field: &'static str, buf: &mut [u8]) -> Result<()> {
        let needed = buf.len() as u64;
        self.ensure_remaining(field, needed)?;
        self.inner.read_exact(buf).map_err(|err| match err.kind() {
            ErrorKind::UnexpectedEof => StegoError::TruncatedStream {
                field,
                needed,
                available: self.remaining(),
            },
            _ => StegoError::Io(err),
        })?;
        self.position += needed;
        Ok(())
    }

    /// 从流的起点读取 54 字节头部。
    pub fn read_header(&mut self) -> Result<[u8; BMP_HEADER_SIZE]> {
        self.seek_to(0)?;
        let mut raw = [0u8; BMP_HEADER_SIZE];
        self.read_run("BMP header", &mut raw)?;
        Ok(raw)
    }

    /// 把源中剩余的所有字节原样复制到目标，返回复制的字节数。
    pub fn copy_rest_into<W: Write>(&mut self, sink: &mut CarrierSink<W>) -> Result<u64> {
        let copied = io::copy(&mut self.inner, &mut sink.inner)?;
        self.position += copied;
        sink.written += copied;
        Ok(copied)
    }
}

/// 只写的载体目标，统计写出的字节数以便核对输出长度。
#[derive(Debug)]
pub struct CarrierSink<W> {
    inner: W,
    written: u64,
}

impl<W: Write> CarrierSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn write_run(&mut self, buf: &[u8]) -> Result<()> {
        self.inner.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }

    /// 刷新缓冲区并交还内部写入器。
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn header(width: i32, height: i32) -> [u8; BMP_HEADER_SIZE] {
        let mut raw = [0u8; BMP_HEADER_SIZE];
        raw[..2].copy_from_slice(SIGNATURE);
        raw[PIXEL_OFFSET_OFFSET..PIXEL_OFFSET_OFFSET + 4].copy_from_slice(&54u32.to_le_bytes());
        raw[INFO_HEADER_SIZE_OFFSET..INFO_HEADER_SIZE_OFFSET + 4]
            .copy_from_slice(&BITMAPINFOHEADER_SIZE.to_le_bytes());
        raw[BMP_WIDTH_OFFSET..BMP_WIDTH_OFFSET + 4].copy_from_slice(&width.to_le_bytes());
        raw[BMP_HEIGHT_OFFSET..BMP_HEIGHT_OFFSET + 4].copy_from_slice(&height.to_le_bytes());
        raw[26..28].copy_from_slice(&1u16.to_le_bytes());
        raw[BITS_PER_PIXEL_OFFSET..BITS_PER_PIXEL_OFFSET + 2].copy_from_slice(&24u16.to_le_bytes());
        raw
    }

    #[test]
    fn reads_dimensions_little_endian() {
        let parsed = BmpHeader::parse(header(100, 100)).unwrap();
        assert_eq!((parsed.width(), parsed.height()), (100, 100));
        assert_eq!(parsed.capacity_bytes(), 30_000);

        let parsed = BmpHeader::parse(header(0x0102, 3)).unwrap();
        assert_eq!(parsed.width(), 258);
    }

    #[test]
    fn rejects_unsupported_variants() {
        let mut compressed = header(10, 10);
        compressed[COMPRESSION_OFFSET] = 1;
        let mut paletted = header(10, 10);
        paletted[BITS_PER_PIXEL_OFFSET] = 8;
        let mut not_bmp = header(10, 10);
        not_bmp[0] = b'P';
        let mut v5 = header(10, 10);
        v5[INFO_HEADER_SIZE_OFFSET] = 124;

        for raw in [compressed, paletted, not_bmp, v5, header(10, -10), header(0, 10)] {
            assert!(matches!(
                BmpHeader::parse(raw),
                Err(StegoError::UnsupportedImage(_))
            ));
        }
    }

    #[test]
    fn short_reads_are_truncated_stream() {
        let mut source = CarrierSource::new(Cursor::new(vec![0u8; 10])).unwrap();
        let mut buf = [0u8; 8];
        source.read_run("first", &mut buf).unwrap();
        assert_eq!(source.remaining(), 2);

        let err = source.read_run("second", &mut buf).unwrap_err();
        assert!(matches!(
            err,
            StegoError::TruncatedStream {
                field: "second",
                needed: 8,
                available: 2
            }
        ));
    }

    #[test]
    fn copy_rest_moves_source_and_sink_in_lockstep() {
        let data: Vec<u8> = (0..=99).collect();
        let mut source = CarrierSource::new(Cursor::new(data.clone())).unwrap();
        let mut sink = CarrierSink::new(Vec::new());

        let mut head = [0u8; 40];
        source.read_run("head", &mut head).unwrap();
        sink.write_run(&head).unwrap();
        assert_eq!(source.copy_rest_into(&mut sink).unwrap(), 60);
        assert_eq!(source.remaining(), 0);
        assert_eq!(sink.written(), 100);
        assert_eq!(sink.finish().unwrap(), data);
    }
}

//! # 隐写编码模块
//!
//! 严格按顺序执行各阶段：规划容量、复制头部、写入标记、写入扩展名长度与扩展名、
//! 写入负载长度与负载、复制剩余像素。任一阶段失败都会中止整个操作；
//! 已写入目标的字节不会回滚，调用方应丢弃该输出文件。

use crate::capacity::CapacityReport;
use crate::carrier::{BmpHeader, CarrierSink, CarrierSource};
use crate::constants::{BYTE_CARRIER_LEN, CHUNK_PAYLOAD_LEN, LENGTH_CARRIER_LEN, MAGIC_MARKER};
use crate::error::{Result, StegoError};
use crate::lsb;
use crate::payload::Extension;
use log::{debug, info};
use std::io::{Read, Seek, Write};

/// 一次成功编码的统计信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSummary {
    pub report: CapacityReport,
    /// 最低位被改写的载体字节数。
    pub embedded_bytes: u64,
    /// 输出流的总字节数，恒等于源图像的字节数。
    pub output_bytes: u64,
}

/// 已通过容量检查、尚未写出任何字节的编码器。
#[derive(Debug)]
pub struct StegoEncoder<R> {
    source: CarrierSource<R>,
    header: BmpHeader,
    extension: Extension,
    payload_len: u32,
    report: CapacityReport,
}

impl<R: Read + Seek> StegoEncoder<R> {
    /// 读取并校验源图像头部，计算容量报告；容量不足时返回
    /// [`StegoError::CapacityExceeded`]，此时不会产生任何输出。
    pub fn plan(source: R, extension: Extension, payload_len: u64) -> Result<Self> {
        let mut source = CarrierSource::new(source)?;
        let header = BmpHeader::parse(source.read_header()?)?;
        debug!(
            "Width = {}, Height = {}, stream length = {}",
            header.width(),
            header.height(),
            source.stream_len()
        );

        let report = CapacityReport::plan(
            header.capacity_bytes(),
            extension.as_bytes().len(),
            payload_len,
        )
        .ensure_sufficient()?;
        // 头部声明的尺寸可能大于文件中实际存在的像素数据
        source.ensure_remaining("pixel data", report.required_bytes)?;

        let payload_len =
            u32::try_from(payload_len).map_err(|_| StegoError::CapacityExceeded {
                required: report.required_bytes,
                available: report.available_bytes,
            })?;

        info!(
            "Capacity check successful: {} of {} carrier bytes required",
            report.required_bytes, report.available_bytes
        );
        Ok(Self {
            source,
            header,
            extension,
            payload_len,
            report,
        })
    }

    pub fn report(&self) -> CapacityReport {
        self.report
    }

    pub fn header(&self) -> &BmpHeader {
        &self.header
    }

    /// 把 `payload` 的 `payload_len` 个字节隐写进图像并写出到 `dest`。
    ///
    /// 源与目标按字节同步推进：每个载体字节恰好被读取一次、写出一次。
    pub fn embed_into<P: Read, W: Write>(mut self, payload: P, dest: W) -> Result<EncodeSummary> {
        let mut sink = CarrierSink::new(dest);

        sink.write_run(self.header.as_bytes())?;
        info!("Header copy successful");

        self.write_bytes("magic marker", MAGIC_MARKER, &mut sink)?;
        info!("Encoding of magic marker successful");

        let extension = self.extension.clone();
        self.write_length("extension length", extension.as_bytes().len() as u32, &mut sink)?;
        info!("Encoding of secret file extension size successful");

        self.write_bytes("extension", extension.as_bytes(), &mut sink)?;
        info!("Encoding of secret file extension '{extension}' successful");

        self.write_length("payload length", self.payload_len, &mut sink)?;
        info!("Encoding of secret file size successful");

        self.write_payload(payload, &mut sink)?;
        info!("Encoding of secret file data successful");

        let embedded_bytes = self.source.position() - self.header.as_bytes().len() as u64;
        let tail = self.source.copy_rest_into(&mut sink)?;
        debug!("Copied {tail} trailing bytes unchanged");
        info!("Remaining image data copy successful");

        let output_bytes = sink.written();
        debug_assert_eq!(output_bytes, self.source.stream_len());
        sink.finish()?;

        Ok(EncodeSummary {
            report: self.report,
            embedded_bytes,
            output_bytes,
        })
    }

    fn write_bytes<W: Write>(
        &mut self,
        field: &'static str,
        data: &[u8],
        sink: &mut CarrierSink<W>,
    ) -> Result<()> {
        let mut carrier = vec![0u8; data.len() * BYTE_CARRIER_LEN];
        self.source.read_run(field, &mut carrier)?;
        lsb::pack_bytes(data, &mut carrier);
        sink.write_run(&carrier)
    }

    fn write_length<W: Write>(
        &mut self,
        field: &'static str,
        value: u32,
        sink: &mut CarrierSink<W>,
    ) -> Result<()> {
        let mut carrier = [0u8; LENGTH_CARRIER_LEN];
        self.source.read_run(field, &mut carrier)?;
        lsb::pack_length(value, &mut carrier);
        sink.write_run(&carrier)
    }

    /// 分批读取秘密数据并隐写，内存占用与负载大小无关。
    fn write_payload<P: Read, W: Write>(
        &mut self,
        mut payload: P,
        sink: &mut CarrierSink<W>,
    ) -> Result<()> {
        let total = u64::from(self.payload_len);
        let mut done = 0u64;
        let mut chunk = Vec::with_capacity(CHUNK_PAYLOAD_LEN);
        let mut carrier = Vec::with_capacity(CHUNK_PAYLOAD_LEN * BYTE_CARRIER_LEN);

        while done < total {
            let want = (total - done).min(CHUNK_PAYLOAD_LEN as u64);
            chunk.clear();
            let got = (&mut payload).take(want).read_to_end(&mut chunk)? as u64;
            if got < want {
                return Err(StegoError::TruncatedStream {
                    field: "secret payload",
                    needed: total,
                    available: done + got,
                });
            }

            carrier.resize(chunk.len() * BYTE_CARRIER_LEN, 0);
            self.source.read_run("payload data", &mut carrier)?;
            lsb::pack_bytes(&chunk, &mut carrier);
            sink.write_run(&carrier)?;
            done += got;
        }
        Ok(())
    }
}

/// 便捷入口：规划并立即执行一次完整编码。
pub fn encode<R, P, W>(
    source: R,
    extension: Extension,
    payload_len: u64,
    payload: P,
    dest: W,
) -> Result<EncodeSummary>
where
    R: Read + Seek,
    P: Read,
    W: Write,
{
    StegoEncoder::plan(source, extension, payload_len)?.embed_into(payload, dest)
}

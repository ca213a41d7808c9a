//! End-to-end alignment tests for `AlignedFlash` over the in-memory device.
//!
//! These tests cover:
//! - The worked read/write/erase scenarios for a 4-byte word, 4KB sector device
//! - Round trips across every small address/length combination
//! - Neighbour bytes inside edge words staying untouched
//! - Staging of sources that are not word aligned in memory
//! - Zero-sized requests
//! - Program checking through `VerifyingDevice`

use aligned::{A4, Aligned};
use alignflash::{
    AlignError, AlignedFlash, DeviceStats, FlashDevice, RamFlash, VerifyError, VerifyingDevice,
    WriteRecord,
};

const SECTOR: u32 = 4096;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn erased_flash(sectors: u32) -> AlignedFlash<RamFlash> {
    init_logging();
    AlignedFlash::new(RamFlash::new(sectors * SECTOR, SECTOR))
}

/// Deterministic non-0xFF test data.
fn pattern(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed) & 0x7F)
        .collect()
}

#[test]
fn test_unaligned_write_leaves_neighbours_erased() -> anyhow::Result<()> {
    let mut flash = erased_flash(1);

    flash.write(2, &[0xAA, 0xBB, 0xCC, 0xDD])?;

    assert_eq!(
        &flash.device().as_bytes()[..8],
        &[0xFF, 0xFF, 0xAA, 0xBB, 0xCC, 0xDD, 0xFF, 0xFF]
    );
    // Two edge words, no interior
    assert_eq!(
        flash.device().write_log(),
        &[
            WriteRecord { address: 0, len: 4 },
            WriteRecord { address: 4, len: 4 }
        ]
    );
    Ok(())
}

#[test]
fn test_read_spanning_two_words() -> anyhow::Result<()> {
    let mut flash = erased_flash(1);
    flash
        .device_mut()
        .preload(0, &[0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);

    let mut buf = [0u8; 6];
    flash.read(1, &mut buf)?;

    assert_eq!(buf, [0x02, 0x03, 0x04, 0x05, 0x06, 0x07]);
    assert_eq!(flash.device().stats().reads, 2);
    Ok(())
}

#[test]
fn test_erase_two_sectors_in_order() -> anyhow::Result<()> {
    let mut flash = erased_flash(4);
    flash.device_mut().preload(0, &[0u8; 2 * SECTOR as usize]);

    flash.erase(0, 2 * SECTOR)?;

    assert_eq!(flash.device().erased_sectors(), &[0, 1]);
    assert_eq!(flash.device().stats().erases, 2);

    let mut buf = vec![0u8; 2 * SECTOR as usize];
    flash.read(0, &mut buf)?;
    assert!(buf.iter().all(|b| *b == 0xFF));
    Ok(())
}

#[test]
fn test_unaligned_source_matches_aligned_source() -> anyhow::Result<()> {
    const LEN: usize = 1500;

    let data = pattern(LEN, 7);
    let mut aligned_src: Aligned<A4, [u8; LEN + 4]> = Aligned([0; LEN + 4]);
    let mut unaligned_src: Aligned<A4, [u8; LEN + 4]> = Aligned([0; LEN + 4]);
    aligned_src[..LEN].copy_from_slice(&data);
    unaligned_src[1..LEN + 1].copy_from_slice(&data);

    for address in [0u32, 3, 4097] {
        let mut direct = erased_flash(2);
        let mut staged = erased_flash(2);

        direct.write(address, &aligned_src[..LEN])?;
        staged.write(address, &unaligned_src[1..LEN + 1])?;

        assert_eq!(
            direct.device().as_bytes(),
            staged.device().as_bytes(),
            "address {address}"
        );

        let mut buf = vec![0u8; LEN];
        staged.read(address, &mut buf)?;
        assert_eq!(buf, data, "address {address}");
    }
    Ok(())
}

#[test]
fn test_staging_chunk_count() -> anyhow::Result<()> {
    init_logging();
    let backing: Aligned<A4, [u8; 101]> = Aligned([0x11; 101]);
    // 100 interior bytes, 1 byte past an aligned base
    let src = &backing[1..];

    let mut staged = AlignedFlash::<_, 4>::with_staging(RamFlash::new(SECTOR, SECTOR));
    staged.write(0, src)?;
    // ceil(100 / 16) chunks
    assert_eq!(staged.device().stats().writes, 7);
    assert_eq!(staged.device().write_log()[6], WriteRecord { address: 96, len: 4 });

    let mut direct = AlignedFlash::<_, 4>::with_staging(RamFlash::new(SECTOR, SECTOR));
    direct.write(0, &backing[..100])?;
    assert_eq!(direct.device().stats().writes, 1);

    assert_eq!(staged.device().as_bytes(), direct.device().as_bytes());
    Ok(())
}

#[test]
fn test_round_trip_small_ranges() -> anyhow::Result<()> {
    for address in 0u32..9 {
        for len in 0usize..14 {
            let mut flash = erased_flash(1);
            let data = pattern(len, address as u8);

            flash.write(address, &data)?;

            let mut buf = vec![0u8; len];
            flash.read(address, &mut buf)?;
            assert_eq!(buf, data, "address {address} len {len}");

            // Everything outside the request is still erased
            let bytes = flash.device().as_bytes();
            let (start, end) = (address as usize, address as usize + len);
            assert!(
                bytes[..start].iter().chain(&bytes[end..32]).all(|b| *b == 0xFF),
                "address {address} len {len}"
            );
        }
    }
    Ok(())
}

#[test]
fn test_edge_writes_keep_programmed_neighbours() -> anyhow::Result<()> {
    let mut flash = erased_flash(1);

    flash.write(0, &[0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x80])?;
    flash.erase(0, SECTOR)?;

    // Fill the two words byte by byte, out of order
    for (address, byte) in [(5u32, 0x06u8), (1, 0x02), (7, 0x08), (0, 0x01), (3, 0x04)] {
        flash.write(address, &[byte])?;
    }
    flash.write(2, &[0x03])?;
    flash.write(4, &[0x05])?;
    flash.write(6, &[0x07])?;

    let mut buf = [0u8; 8];
    flash.read(0, &mut buf)?;
    assert_eq!(buf, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
    Ok(())
}

#[test]
fn test_rewrite_without_erase_ands_bits() -> anyhow::Result<()> {
    let mut flash = erased_flash(1);

    flash.write(10, &[0b1111_0000])?;
    flash.write(10, &[0b0011_1100])?;

    let mut buf = [0u8; 1];
    flash.read(10, &mut buf)?;
    assert_eq!(buf, [0b0011_0000]);
    Ok(())
}

#[test]
fn test_zero_sized_requests_touch_nothing() -> anyhow::Result<()> {
    let mut flash = erased_flash(2);

    flash.read(3, &mut [])?;
    flash.write(7, &[])?;
    flash.erase(SECTOR, 0)?;
    // Shorter than a sector truncates to nothing
    flash.erase(0, 100)?;
    // Empty requests never overflow, wherever they sit
    flash.read(u32::MAX - 1, &mut [])?;
    flash.write(u32::MAX, &[])?;
    flash.erase(u32::MAX, 0)?;

    assert_eq!(flash.device().stats(), DeviceStats::default());
    Ok(())
}

#[test]
fn test_unaligned_erase_truncates() -> anyhow::Result<()> {
    let mut flash = erased_flash(4);

    flash.erase(SECTOR + 10, 2 * SECTOR + 5)?;

    assert_eq!(flash.device().erased_sectors(), &[1, 2]);
    Ok(())
}

#[test]
fn test_request_past_address_space() {
    let mut flash = erased_flash(1);
    let mut buf = [0u8; 8];

    let err = flash.read(u32::MAX - 3, &mut buf).unwrap_err();
    assert!(matches!(err, AlignError::Range(_)));
    assert_eq!(flash.device().stats().total(), 0);
}

#[test]
fn test_generic_over_device() -> anyhow::Result<()> {
    fn fill<D: FlashDevice>(flash: &mut AlignedFlash<D>) -> Result<(), AlignError<D::Error>> {
        flash.write(1, b"generic")
    }

    init_logging();
    let mut ram = RamFlash::new(SECTOR, SECTOR);
    // Borrowed devices work too
    let mut flash = AlignedFlash::new(&mut ram);
    fill(&mut flash)?;

    assert_eq!(&ram.as_bytes()[1..8], b"generic");
    Ok(())
}

#[test]
fn test_verifying_device_accepts_erased_targets() -> anyhow::Result<()> {
    init_logging();
    let mut flash = AlignedFlash::new(VerifyingDevice::new(RamFlash::new(2 * SECTOR, SECTOR)));

    flash.write(1, &pattern(600, 3))?;
    flash.write(601, &[0x00, 0x01, 0x02])?;

    let mut buf = [0u8; 3];
    flash.read(601, &mut buf)?;
    assert_eq!(buf, [0x00, 0x01, 0x02]);
    Ok(())
}

#[test]
fn test_verifying_device_rejects_rewrite_until_erased() -> anyhow::Result<()> {
    init_logging();
    let mut flash = AlignedFlash::new(VerifyingDevice::new(RamFlash::new(2 * SECTOR, SECTOR)));

    flash.write(SECTOR + 2, &[0x00])?;

    let err = flash.write(SECTOR + 2, &[0x80]).unwrap_err();
    match err {
        AlignError::DeviceIo { source, .. } => assert_eq!(
            source,
            VerifyError::WouldSetBits {
                address: SECTOR + 2,
                current: 0x00,
                requested: 0x80
            }
        ),
        other => panic!("unexpected error: {other}"),
    }

    flash.erase(SECTOR, SECTOR)?;
    flash.write(SECTOR + 2, &[0x80])?;

    let mut buf = [0u8; 1];
    flash.read(SECTOR + 2, &mut buf)?;
    assert_eq!(buf, [0x80]);
    Ok(())
}

#![no_main]

use fsmutator::decode::decode_bytes;
use fsmutator::locate::{detect, locate};
use fsmutator::restore::magic_sites;
use fsmutator::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = detect(data);

    for fs in [FsType::Ufs1, FsType::Ufs2, FsType::Ext] {
        for &kind in fs.kinds() {
            let layout = FieldLayout::of(fs, kind).unwrap();
            let locs = locate(fs, kind, data).unwrap();
            for &base in locs.iter() {
                // canonical UFS slots may be injected without the magic
                let sb = decode_bytes(layout, data, base).unwrap();
                assert_eq!(sb.to_bytes(), &data[base..base + layout.size]);
                let _ = sb.to_string();
            }
        }

        for site in magic_sites(fs, data) {
            assert!(site.end() <= data.len());
        }
    }
});

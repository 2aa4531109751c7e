use super::setup;

#[test]
fn test_read_after_eviction_rematerializes_read_only() {
    let _guard = setup("test_read_after_eviction_rematerializes_read_only", 4);

    let region = crate::allocate(1).unwrap();
    unsafe { region.write_volatile(b'y') };

    // push the region out of RAM
    for _ in 0..4 {
        crate::allocate(1).unwrap();
    }

    // read fault: the region comes back read-only with its old content
    assert_eq!(unsafe { region.read_volatile() }, b'y');

    // write fault on the read-only mapping: the region turns dirty again
    unsafe { region.write_volatile(b'z') };
    assert_eq!(unsafe { region.read_volatile() }, b'z');

    // drain the queue so the second write has to survive a full eviction
    for _ in 0..8 {
        crate::writeback().unwrap();
    }

    assert_eq!(unsafe { region.read_volatile() }, b'z');

    let stats = crate::stats().unwrap();
    assert!(stats.writebacks >= 2);

    crate::term().unwrap();
}

use super::setup;

/// An access past a region's end (but still inside its page) must not be
/// resolved: the handler hands it to the default disposition and the
/// process dies. Run in a forked child so the test can observe the death.
#[test]
fn test_out_of_bounds_access_is_delegated() {
    let _guard = setup("test_out_of_bounds_access_is_delegated", 4);

    let region = crate::allocate(7).unwrap();

    unsafe {
        match libc::fork() {
            -1 => panic!("fork failed"),
            0 => {
                // offset 8 is past the inclusive bound of a 7 byte region
                region.add(8).write_volatile(1);

                // only reached if the stray access was wrongly resolved
                libc::_exit(2);
            }
            child => {
                let mut status = 0;
                assert_eq!(libc::waitpid(child, &mut status, 0), child);

                assert!(
                    libc::WIFSIGNALED(status),
                    "child was not killed, status {:#x}",
                    status
                );
                assert_eq!(libc::WTERMSIG(status), libc::SIGSEGV);
            }
        }
    }

    crate::term().unwrap();
}

use std::array;

use env_logger::{Builder, Env};
use rand::{rngs::SmallRng, RngCore, SeedableRng};

use fs_heap::FsHeapConfig;

type TestData = [u8; 16];

fn rand_data(rand: &mut SmallRng) -> TestData {
    array::from_fn(|_| rand.next_u32() as u8)
}

unsafe fn write_data(ptr: *mut u8, data: &TestData) {
    for (i, byte) in data.iter().enumerate() {
        ptr.add(i).write_volatile(*byte);
    }
}

unsafe fn read_data(ptr: *const u8) -> TestData {
    array::from_fn(|i| ptr.add(i).read_volatile())
}

fn main() {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Info)
        .format_module_path(false)
        .init();

    // a working set far above the residency bound, so regions constantly
    // swap in and out underneath the accesses
    fs_heap::init(
        "/tmp/fs_heap_playground.store",
        FsHeapConfig { capacity: 8 },
    )
    .unwrap();

    const SEED: u64 = 5446535461589659585;
    const REGION_COUNT: usize = 100;
    const ITERATIONS: usize = 100_000;

    let mut rand = SmallRng::seed_from_u64(SEED);

    let mut regions = vec![];
    let mut check_states = vec![];

    for _ in 0..REGION_COUNT {
        let data = rand_data(&mut rand);
        let region = fs_heap::allocate(16).unwrap();

        unsafe { write_data(region, &data) };
        regions.push(region);
        check_states.push(data);
    }

    for iteration in 0..ITERATIONS {
        let i = rand.next_u32() as usize % regions.len();
        let test_type = rand.next_u32() % 10;

        if test_type < 3 {
            // overwrite with fresh data
            let data = rand_data(&mut rand);
            unsafe { write_data(regions[i], &data) };
            check_states[i] = data;
        } else {
            // read and compare against the shadow copy
            assert_eq!(
                unsafe { read_data(regions[i]) },
                check_states[i],
                "content mismatch in iteration {}",
                iteration
            );
        }
    }

    let stats = fs_heap::stats().unwrap();
    println!(
        "allocs: {}, frees: {}, cache hits: {}, writebacks: {}",
        stats.allocs, stats.frees, stats.cache_hits, stats.writebacks
    );

    for region in regions {
        fs_heap::free(region).unwrap();
    }
    fs_heap::term().unwrap();
}

//! C ABI used by an external renderer to drive the simulation.
//!
//! Functions returning `bool` report `false` when the handle is null or the
//! operation failed; the failure is logged.

use crate::{
    body::Body,
    buffer::KernelBody,
    config::Config,
    scenario::Bounds,
    simulation::Simulation,
};
use ultraviolet::DVec2;

/// Creates a simulation with default settings and `workers` threads.
/// Returns null if the worker pool cannot be created.
#[unsafe(no_mangle)]
pub extern "C" fn Simulation_Create(workers: usize) -> *mut Simulation {
    match Simulation::new(Config::default().with_workers(workers.max(1))) {
        Ok(sim) => Box::into_raw(Box::new(sim)),
        Err(e) => {
            log::error!("failed to create simulation: {e}");
            std::ptr::null_mut()
        }
    }
}

/// # Safety
/// `handle` must be null or a pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Destroy(handle: *mut Simulation) {
    if !handle.is_null() {
        unsafe { drop(Box::from_raw(handle)) };
    }
}

/// Advances one tick and returns the number of merges, or 0 for a null handle.
///
/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Step(handle: *mut Simulation) -> usize {
    unsafe { handle.as_mut() }.map_or(0, |sim| sim.step().merges)
}

/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodyCount(handle: *const Simulation) -> usize {
    unsafe { handle.as_ref() }.map_or(0, |sim| sim.bodies().len())
}

/// Pointer to the current bodies, valid until the next mutating call.
///
/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetBodies(handle: *const Simulation) -> *const Body {
    unsafe { handle.as_ref() }.map_or(std::ptr::null(), |sim| sim.bodies().as_ptr())
}

/// Uploads the bodies into the fixed-layout kernel buffer and returns it.
/// `count` receives the number of records.
///
/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`;
/// `count` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetKernelInput(handle: *mut Simulation, count: *mut usize) -> *const KernelBody {
    let Some(sim) = (unsafe { handle.as_mut() }) else {
        return std::ptr::null();
    };
    match sim.kernel_buffer() {
        Ok(buffer) => {
            if let Some(count) = unsafe { count.as_mut() } {
                *count = buffer.count() as usize;
            }
            buffer.input().as_ptr()
        }
        Err(e) => {
            log::error!("kernel upload failed: {e}");
            std::ptr::null()
        }
    }
}

/// Output buffer a native kernel writes into, with the same layout and
/// capacity as the last uploaded input. `count` receives the record count.
/// Returns null if nothing has been uploaded.
///
/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`;
/// `count` must be null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_GetKernelOutput(handle: *mut Simulation, count: *mut usize) -> *mut KernelBody {
    let Some(buffer) = (unsafe { handle.as_mut() }).and_then(Simulation::staging_mut) else {
        return std::ptr::null_mut();
    };
    let output = buffer.output_mut();
    if let Some(count) = unsafe { count.as_mut() } {
        *count = output.len();
    }
    output.as_mut_ptr()
}

/// Replaces the bodies with the kernel output buffer's live records.
///
/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_CommitKernelOutput(handle: *mut Simulation) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|sim| {
        sim.commit_kernel_output()
            .map_err(|e| log::error!("kernel output rejected: {e}"))
            .is_ok()
    })
}

/// Adds a unit body, as placed interactively by the user.
///
/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Spawn(
    handle: *mut Simulation,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    is_static: bool,
) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|sim| {
        sim.spawn(DVec2::new(x, y), DVec2::new(vx, vy), is_static)
            .map_err(|e| log::warn!("spawn rejected: {e}"))
            .is_ok()
    })
}

/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_AddBody(
    handle: *mut Simulation,
    x: f64,
    y: f64,
    vx: f64,
    vy: f64,
    mass: f64,
    radius: f64,
) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|sim| {
        sim.add_body(Body::new(DVec2::new(x, y), DVec2::new(vx, vy), mass, radius))
            .map_err(|e| log::warn!("body rejected: {e}"))
            .is_ok()
    })
}

/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_Clear(handle: *mut Simulation) {
    if let Some(sim) = unsafe { handle.as_mut() } {
        sim.clear();
    }
}

/// Replaces the bodies with an accretion disk centered in a `width` x `height` view.
///
/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_ResetAccretionDisk(
    handle: *mut Simulation,
    count: usize,
    disk_radius: f64,
    center_mass: f64,
    width: f64,
    height: f64,
    seed: u64,
) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|sim| {
        let mut rng = fastrand::Rng::with_seed(seed);
        sim.reset_accretion_disk(count, disk_radius, center_mass, Bounds::from_size(width, height), &mut rng)
            .map_err(|e| log::warn!("accretion disk rejected: {e}"))
            .is_ok()
    })
}

/// Adds a random field of bodies centered in a `width` x `height` view.
///
/// # Safety
/// `handle` must be null or a live pointer returned by `Simulation_Create`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Simulation_AddRandomField(
    handle: *mut Simulation,
    count: usize,
    speed: f64,
    radius: f64,
    width: f64,
    height: f64,
    seed: u64,
) -> bool {
    unsafe { handle.as_mut() }.is_some_and(|sim| {
        let mut rng = fastrand::Rng::with_seed(seed);
        sim.add_random_field(count, speed, radius, Bounds::from_size(width, height), &mut rng)
            .map_err(|e| log::warn!("random field rejected: {e}"))
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_through_handle() {
        let handle = Simulation_Create(2);
        assert!(!handle.is_null());
        unsafe {
            assert!(Simulation_ResetAccretionDisk(handle, 50, 300.0, 1000.0, 800.0, 600.0, 9));
            assert!(Simulation_Spawn(handle, 10.0, 10.0, 0.0, 0.0, false));
            assert_eq!(Simulation_GetBodyCount(handle), 52);

            Simulation_Step(handle);
            let count = Simulation_GetBodyCount(handle);
            let bodies = std::slice::from_raw_parts(Simulation_GetBodies(handle), count);
            assert!(bodies[0].is_static);
            assert_eq!(bodies[0].pos, DVec2::new(400.0, 300.0));

            assert!(!Simulation_CommitKernelOutput(handle));

            let mut records = 0usize;
            let input = Simulation_GetKernelInput(handle, &mut records);
            assert_eq!(records, count);
            let input = std::slice::from_raw_parts(input, records).to_vec();

            let mut capacity = 0usize;
            let output = Simulation_GetKernelOutput(handle, &mut capacity);
            assert_eq!(capacity, records);
            let output = std::slice::from_raw_parts_mut(output, capacity);
            output.copy_from_slice(&input);
            output[0].mass += output[records - 1].mass;
            output[records - 1].is_dead = 1;

            assert!(Simulation_CommitKernelOutput(handle));
            assert_eq!(Simulation_GetBodyCount(handle), count - 1);
            assert!(!Simulation_CommitKernelOutput(handle));

            Simulation_Clear(handle);
            assert_eq!(Simulation_GetBodyCount(handle), 0);
            Simulation_Destroy(handle);
        }
    }

    #[test]
    fn null_handle_is_harmless() {
        let null = std::ptr::null_mut();
        unsafe {
            assert_eq!(Simulation_Step(null), 0);
            assert_eq!(Simulation_GetBodyCount(null), 0);
            assert!(Simulation_GetBodies(null).is_null());
            assert!(Simulation_GetKernelOutput(null, std::ptr::null_mut()).is_null());
            assert!(!Simulation_AddBody(null, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0));
            Simulation_Destroy(null);
        }
    }
}

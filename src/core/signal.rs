use winsys::Result;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use nix::libc::c_int;
use nix::sys::signal::sigaction;
use nix::sys::signal::SaFlags;
use nix::sys::signal::SigAction;
use nix::sys::signal::SigHandler;
use nix::sys::signal::SigSet;
use nix::sys::signal::Signal;
use nix::sys::wait::waitpid;
use nix::sys::wait::WaitPidFlag;
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

const HANDLED: [Signal; 11] = [
    Signal::SIGINT,
    Signal::SIGTERM,
    Signal::SIGPIPE,
    Signal::SIGHUP,
    Signal::SIGUSR1,
    Signal::SIGUSR2,
    Signal::SIGCHLD,
    Signal::SIGSEGV,
    Signal::SIGBUS,
    Signal::SIGFPE,
    Signal::SIGILL,
];

static PENDING: AtomicUsize = AtomicUsize::new(0);
static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SignalAction {
    Shutdown,
    Reconfigure,
    Reload,
    ReapChildren,
    Ignore,
}

fn is_fatal(signal: Signal) -> bool {
    match signal {
        Signal::SIGSEGV | Signal::SIGBUS | Signal::SIGFPE | Signal::SIGILL => true,
        _ => false,
    }
}

fn bit_of(signal: Signal) -> Option<usize> {
    HANDLED
        .iter()
        .position(|&handled| handled == signal)
        .map(|index| 1 << index)
}

/// Runs in signal context: only atomics are touched here.
fn record(signal: Signal) {
    if is_fatal(signal) && SHUTTING_DOWN.swap(true, Ordering::SeqCst) {
        std::process::abort();
    }

    if let Some(bit) = bit_of(signal) {
        PENDING.fetch_or(bit, Ordering::SeqCst);
    }
}

extern "C" fn on_signal(signum: c_int) {
    if let Some(&signal) = HANDLED.iter().find(|&&signal| signal as c_int == signum) {
        record(signal);
    }
}

pub fn install() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_signal),
        SaFlags::SA_NOCLDSTOP,
        SigSet::empty(),
    );

    for &signal in HANDLED.iter() {
        unsafe {
            sigaction(signal, &action)?;
        }
    }

    debug!("installed handlers for {} signals", HANDLED.len());
    Ok(())
}

/// Marks that an orderly shutdown has started, so that a fatal signal
/// arriving from here on aborts the process.
pub fn begin_shutdown() {
    SHUTTING_DOWN.store(true, Ordering::SeqCst);
}

#[inline]
pub fn pending() -> bool {
    PENDING.load(Ordering::SeqCst) != 0
}

pub fn drain() -> Vec<SignalAction> {
    actions_for(PENDING.swap(0, Ordering::SeqCst))
}

fn actions_for(mask: usize) -> Vec<SignalAction> {
    HANDLED
        .iter()
        .enumerate()
        .filter(|(index, _)| mask & (1 << index) != 0)
        .map(|(_, &signal)| match signal {
            Signal::SIGINT | Signal::SIGTERM | Signal::SIGPIPE => SignalAction::Shutdown,
            Signal::SIGHUP => SignalAction::Reconfigure,
            Signal::SIGUSR1 => SignalAction::Reload,
            Signal::SIGCHLD => SignalAction::ReapChildren,
            signal if is_fatal(signal) => SignalAction::Shutdown,
            _ => SignalAction::Ignore,
        })
        .collect()
}

pub fn reap_children() {
    loop {
        match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(status) => trace!("reaped child: {:?}", status),
        }
    }
}

use anyhow::Result;
use std::thread::sleep;
use std::time::Duration;

const RETRY_PAUSE: Duration = Duration::from_secs(1);

/// Re-attempt a metadata update that was refused transiently.
///
/// Retries while `update` returns `Ok(None)`, pausing one second between
/// attempts, up to `retries` times. A hard error aborts immediately;
/// exhaustion is logged and the last value returned.
pub fn retry_update<T>(
	update: impl FnMut() -> Result<Option<T>>,
	what: &str,
	retries: u32,
) -> Result<Option<T>> {
	retry_update_with_pause(update, what, retries, RETRY_PAUSE)
}

pub fn retry_update_with_pause<T>(
	mut update: impl FnMut() -> Result<Option<T>>,
	what: &str,
	retries: u32,
	pause: Duration,
) -> Result<Option<T>> {
	let mut attempt = update()?;
	let mut remaining = retries;
	while attempt.is_none() && remaining > 0 {
		log::debug!("transient failure updating {what}, retrying ({remaining} attempts left)");
		sleep(pause);
		attempt = update()?;
		remaining -= 1;
	}
	if attempt.is_none() {
		log::warn!("giving up updating {what} after {retries} retries");
	}
	Ok(attempt)
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::bail;

	#[test]
	fn succeeds_after_transient_refusals() {
		let mut calls = 0;
		let result = retry_update_with_pause(
			|| {
				calls += 1;
				Ok(if calls < 3 { None } else { Some(calls) })
			},
			"record",
			5,
			Duration::ZERO,
		)
		.unwrap();
		assert_eq!(result, Some(3));
		assert_eq!(calls, 3);
	}

	#[test]
	fn exhaustion_returns_none() {
		let mut calls = 0;
		let result: Option<u32> = retry_update_with_pause(
			|| {
				calls += 1;
				Ok(None)
			},
			"record",
			5,
			Duration::ZERO,
		)
		.unwrap();
		assert_eq!(result, None);
		// one initial attempt plus five retries
		assert_eq!(calls, 6);
	}

	#[test]
	fn hard_error_aborts() {
		let mut calls = 0;
		let result: Result<Option<u32>> = retry_update_with_pause(
			|| {
				calls += 1;
				if calls == 2 {
					bail!("store unreachable");
				}
				Ok(None)
			},
			"record",
			5,
			Duration::ZERO,
		);
		assert!(result.is_err());
		assert_eq!(calls, 2);
	}
}

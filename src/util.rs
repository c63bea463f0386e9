#[macro_export]
macro_rules! ok_or_continue {
	( $e:expr ) => (
		match $e {
			Ok(value) => value,
			Err(_e) => {
				continue;
			},
		}
	)
}

/// A fixed-size grid stored row by row.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct Array2d<T: Default + Copy> {
	width: usize,
	height: usize,
	vec: Vec<T>,
}

impl<T: Default + Copy> Array2d<T> {
	pub fn new(width: usize, height: usize) -> Self {
		return Self { width, height, vec: vec![T::default(); width * height] };
	}

	pub fn filled(width: usize, height: usize, value: T) -> Self {
		return Self { width, height, vec: vec![value; width * height] };
	}

	pub fn get(&self, x: usize, y: usize) -> Option<T> {
		if x >= self.width || y >= self.height {
			return None;
		}

		return Some(self.vec[y * self.width + x]);
	}

	pub fn set(&mut self, x: usize, y: usize, value: T) {
		assert!(x < self.width);
		assert!(y < self.height);

		self.vec[y * self.width + x] = value;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn out_of_range_reads_are_none() {
		let mut grid = Array2d::<u8>::new(3, 2);
		grid.set(2, 1, 7);

		assert_eq!(grid.get(2, 1), Some(7));
		assert_eq!(grid.get(0, 0), Some(0));
		assert_eq!(grid.get(3, 0), None);
		assert_eq!(grid.get(0, 2), None);
	}
}

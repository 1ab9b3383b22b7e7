pub mod assessment;
pub mod evidence;

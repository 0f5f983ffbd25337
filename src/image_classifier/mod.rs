#[cfg(test)]
pub mod impl_fake;
pub mod inference_engine;
pub mod interface;

#[cfg(test)]
mod test;

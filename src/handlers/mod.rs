pub mod speak;

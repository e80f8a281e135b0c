pub mod matcap;

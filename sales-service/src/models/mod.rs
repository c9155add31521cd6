pub mod sale;

pub use sale::{
    LineItemResponse, Sale, SaleLineItem, SaleResponse, SaleStatus, SaleSummaryResponse,
};

mod callbacks;
mod cart;
mod helpers;
mod payments;

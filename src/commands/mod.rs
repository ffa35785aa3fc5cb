// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod bookings;
pub mod customers;
pub mod doctor;
pub mod exporter;
pub mod hotels;
pub mod invoices;
pub mod payments;
pub mod reports;
pub mod settings;

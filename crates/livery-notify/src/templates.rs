// SPDX-FileCopyrightText: 2026 Livery Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure HTML/text formatting for notification messages.
//!
//! Templates never see the polymorphic destinations shape: callers go
//! through [`QuoteView`], which flattens either shape into fixed
//! `destination1..destination4` slots plus optional return-leg fields.

use livery_core::ids::short_ref;
use livery_core::types::Destinations;
use livery_storage::Quote;

/// Flattened, template-friendly projection of a quote record.
#[derive(Debug, Clone, Default)]
pub struct QuoteView {
    pub short_ref: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub pickup_location: String,
    pub destination1: Option<String>,
    pub destination2: Option<String>,
    pub destination3: Option<String>,
    pub destination4: Option<String>,
    pub date: String,
    pub time: String,
    pub vehicle_name: Option<String>,
    pub passenger_count: i64,
    pub quoted_price: f64,
    pub has_return_trip: bool,
    pub return_pickup: Option<String>,
    pub return_destination: Option<String>,
    pub return_date: Option<String>,
    pub return_time: Option<String>,
}

impl QuoteView {
    /// Flatten a quote. The first four waypoints fill the destination
    /// slots; any further stops are dropped from the rendering only,
    /// never from the record.
    pub fn from_quote(quote: &Quote) -> Self {
        let mut view = QuoteView {
            short_ref: short_ref(&quote.id),
            name: quote.name.clone(),
            email: quote.email.clone(),
            phone: quote.phone.clone(),
            pickup_location: quote.pickup_location.clone(),
            date: quote.date.clone(),
            time: quote.time.clone(),
            vehicle_name: quote.vehicle_name.clone(),
            passenger_count: quote.passenger_count,
            quoted_price: quote.quoted_price,
            ..Default::default()
        };

        match &quote.destinations {
            Destinations::SingleLeg(stops) => {
                view.fill_destinations(stops);
            }
            Destinations::ReturnTrip(rt) => {
                view.has_return_trip = true;
                view.pickup_location = rt.outbound.pickup.clone();
                view.fill_destinations(&rt.outbound.destinations);
                view.date = rt.outbound.date.clone();
                view.time = rt.outbound.time.clone();
                view.return_pickup = Some(rt.return_leg.pickup.clone());
                view.return_destination = rt.return_leg.last_destination().map(str::to_string);
                view.return_date = Some(rt.return_leg.date.clone());
                view.return_time = Some(rt.return_leg.time.clone());
            }
        }
        view
    }

    fn fill_destinations(&mut self, stops: &[String]) {
        let mut slots = stops.iter().cloned();
        self.destination1 = slots.next();
        self.destination2 = slots.next();
        self.destination3 = slots.next();
        self.destination4 = slots.next();
    }

    fn destination_lines(&self) -> String {
        [
            &self.destination1,
            &self.destination2,
            &self.destination3,
            &self.destination4,
        ]
        .iter()
        .flat_map(|d| d.as_deref())
        .map(|d| format!("<li>{d}</li>"))
        .collect::<Vec<_>>()
        .join("\n")
    }

    fn return_block(&self) -> String {
        if !self.has_return_trip {
            return String::new();
        }
        format!(
            "<h3>Return journey</h3>\
             <p>Pickup: {} on {} at {}</p>",
            self.return_pickup.as_deref().unwrap_or("-"),
            self.return_date.as_deref().unwrap_or("-"),
            self.return_time.as_deref().unwrap_or("-"),
        )
    }
}

fn trip_summary(view: &QuoteView) -> String {
    format!(
        "<h3>Trip details</h3>\
         <p>Pickup: {} on {} at {}</p>\
         <ul>{}</ul>\
         <p>Vehicle: {} &middot; Passengers: {} &middot; Quoted: &pound;{:.2}</p>\
         {}",
        view.pickup_location,
        view.date,
        view.time,
        view.destination_lines(),
        view.vehicle_name.as_deref().unwrap_or("To be assigned"),
        view.passenger_count,
        view.quoted_price,
        view.return_block(),
    )
}

/// "Booking received" email to the customer, carrying the confirm link.
pub fn booking_received_customer(
    view: &QuoteView,
    confirm_url: &str,
    service_name: &str,
) -> (String, String) {
    let subject = format!("Your {service_name} quote (ref {})", view.short_ref);
    let html = format!(
        "<h2>Thank you, {}</h2>\
         <p>We have received your quote request. Review the details below and \
         confirm your booking when you are ready.</p>\
         {}\
         <p><a href=\"{confirm_url}\">Confirm this booking</a></p>\
         <p>{service_name}</p>",
        view.name,
        trip_summary(view),
    );
    (subject, html)
}

/// "New lead" email to the staff inbox.
pub fn booking_received_admin(view: &QuoteView, service_name: &str) -> (String, String) {
    let subject = format!("New quote request {} - {}", view.short_ref, view.name);
    let html = format!(
        "<h2>New quote request</h2>\
         <p>{} &lt;{}&gt; &middot; {}</p>\
         {}\
         <p>{service_name} dispatch</p>",
        view.name,
        view.email.as_deref().unwrap_or("no email"),
        view.phone,
        trip_summary(view),
    );
    (subject, html)
}

/// Post-confirmation receipt to the customer.
pub fn booking_confirmed_customer(view: &QuoteView, service_name: &str) -> (String, String) {
    let subject = format!("Booking confirmed - ref {}", view.short_ref);
    let html = format!(
        "<h2>Your booking is confirmed</h2>\
         <p>Thank you, {}. Your chauffeur is booked; your reference is \
         <strong>{}</strong>.</p>\
         {}\
         <p>{service_name}</p>",
        view.name,
        view.short_ref,
        trip_summary(view),
    );
    (subject, html)
}

/// Post-confirmation alert to the staff inbox.
pub fn booking_confirmed_admin(view: &QuoteView, service_name: &str) -> (String, String) {
    let subject = format!("Booking CONFIRMED {} - {}", view.short_ref, view.name);
    let html = format!(
        "<h2>Booking confirmed</h2>\
         <p>{} &lt;{}&gt; &middot; {}</p>\
         {}\
         <p>{service_name} dispatch</p>",
        view.name,
        view.email.as_deref().unwrap_or("no email"),
        view.phone,
        trip_summary(view),
    );
    (subject, html)
}

/// SMS body for the post-confirmation text. Must carry the short ref.
pub fn booking_confirmed_sms(view: &QuoteView, service_name: &str) -> String {
    format!(
        "{service_name}: your booking {} is confirmed for {} at {}. Pickup: {}.",
        view.short_ref, view.date, view.time, view.pickup_location,
    )
}

/// Welcome email for a new (or reactivated) marketing subscriber.
pub fn subscription_welcome(discount_code: &str, service_name: &str) -> (String, String) {
    let subject = format!("Welcome to {service_name} - here is your discount code");
    let html = format!(
        "<h2>Welcome aboard</h2>\
         <p>Use code <strong>{discount_code}</strong> for 10% off your next journey.</p>\
         <p>{service_name}</p>",
    );
    (subject, html)
}

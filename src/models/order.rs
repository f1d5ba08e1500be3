// src/models/order.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A loosely typed JSON value: the mobile apps send prices and distances as
/// either numbers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Zero, NaN and the empty string count as "not provided".
    pub fn is_truthy(&self) -> bool {
        match self {
            Scalar::Number(n) => *n != 0.0 && !n.is_nan(),
            Scalar::Text(s) => !s.is_empty(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub calle: Option<String>,
    pub numero: Option<Scalar>,
    pub ciudad: Option<String>,
}

/// The order-creation event posted by the ordering app. Lives for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub numero_orden: Option<Scalar>,
    pub cliente_nombre: Option<String>,
    pub precio: Option<Scalar>,
    #[serde(rename = "precioCalculado")]
    pub precio_calculado: Option<Scalar>,
    #[serde(rename = "distanciaPedido")]
    pub distancia_pedido: Option<Scalar>,
    #[serde(rename = "duracionEstimadaMinutos")]
    pub duracion_estimada_minutos: Option<Scalar>,
    pub direccion: Option<DeliveryAddress>,
}

impl OrderEvent {
    pub const DEFAULT_PRICE: &'static str = "0.00";

    /// Order number as sent, numeric or not. Empty when absent or null.
    pub fn order_number(&self) -> String {
        self.numero_orden
            .as_ref()
            .map(|n| n.to_string())
            .unwrap_or_default()
    }

    pub fn client_name(&self) -> String {
        self.cliente_nombre.clone().unwrap_or_default()
    }

    /// `precio`, then `precioCalculado`, then `"0.00"`.
    pub fn resolved_price(&self) -> String {
        [&self.precio, &self.precio_calculado]
            .into_iter()
            .flatten()
            .find(|price| price.is_truthy())
            .map(|price| price.to_string())
            .unwrap_or_else(|| Self::DEFAULT_PRICE.to_string())
    }

    pub fn distance(&self) -> String {
        stringify_or_zero(self.distancia_pedido.as_ref())
    }

    pub fn estimated_minutes(&self) -> String {
        stringify_or_zero(self.duracion_estimada_minutos.as_ref())
    }

    pub fn street(&self) -> String {
        self.direccion
            .as_ref()
            .and_then(|d| d.calle.clone())
            .unwrap_or_default()
    }

    pub fn street_number(&self) -> String {
        self.direccion
            .as_ref()
            .and_then(|d| d.numero.as_ref())
            .map(|n| n.to_string())
            .unwrap_or_default()
    }

    pub fn city(&self) -> String {
        self.direccion
            .as_ref()
            .and_then(|d| d.ciudad.clone())
            .unwrap_or_default()
    }
}

fn stringify_or_zero(value: Option<&Scalar>) -> String {
    value
        .map(|v| v.to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "0".to_string())
}
